//! OperationOutcome construction.
//!
//! Every error the controllers return is rendered as an OperationOutcome
//! with a single issue.

use serde_json::{Value, json};

/// Issue severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Processing has failed.
    Error,
    /// Informational message.
    Information,
}

impl IssueSeverity {
    /// Returns the FHIR code.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Error => "error",
            IssueSeverity::Information => "information",
        }
    }
}

/// Issue type codes raised by the controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueType {
    /// Invalid content or parameter.
    Invalid,
    /// Resource or version not found.
    NotFound,
    /// Conflict with current state.
    Conflict,
    /// Interaction or content not supported.
    NotSupported,
    /// Request exceeds a processing limit.
    TooCostly,
    /// Unexpected failure while processing.
    Exception,
    /// Informational message.
    Informational,
}

impl IssueType {
    /// Returns the FHIR code.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Invalid => "invalid",
            IssueType::NotFound => "not-found",
            IssueType::Conflict => "conflict",
            IssueType::NotSupported => "not-supported",
            IssueType::TooCostly => "too-costly",
            IssueType::Exception => "exception",
            IssueType::Informational => "informational",
        }
    }
}

/// One issue of an OperationOutcome.
#[derive(Debug, Clone)]
pub struct Issue {
    /// The severity.
    pub severity: IssueSeverity,
    /// The issue code.
    pub code: IssueType,
    /// Human-readable description.
    pub details: String,
}

impl Issue {
    /// Creates an error issue.
    pub fn error(code: IssueType, details: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            code,
            details: details.into(),
        }
    }

    /// Converts to FHIR JSON.
    pub fn to_json(&self) -> Value {
        json!({
            "severity": self.severity.as_str(),
            "code": self.code.as_str(),
            "details": { "text": self.details }
        })
    }
}

/// Builder for OperationOutcome resources.
#[derive(Debug, Default)]
pub struct OperationOutcomeBuilder {
    issues: Vec<Issue>,
}

impl OperationOutcomeBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error issue.
    pub fn error(mut self, code: IssueType, details: impl Into<String>) -> Self {
        self.issues.push(Issue::error(code, details));
        self
    }

    /// Adds an informational issue.
    pub fn information(mut self, details: impl Into<String>) -> Self {
        self.issues.push(Issue {
            severity: IssueSeverity::Information,
            code: IssueType::Informational,
            details: details.into(),
        });
        self
    }

    /// Builds the OperationOutcome resource.
    pub fn build(self) -> Value {
        let issues: Vec<Value> = self.issues.iter().map(Issue::to_json).collect();
        json!({
            "resourceType": "OperationOutcome",
            "issue": issues
        })
    }
}
