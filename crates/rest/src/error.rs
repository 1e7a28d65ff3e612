//! Error types for the profile controllers.
//!
//! Every error is rendered as a FHIR OperationOutcome. Errors raised while
//! serving a profile carry the FHIR base of the request, which selects the
//! `fhirVersion` of the response content type.
//!
//! # Error Mapping
//!
//! | Error | HTTP Status | FHIR Issue Code |
//! |-------|-------------|-----------------|
//! | InvalidParameter | 400 | invalid |
//! | BadRequest | 400 | invalid |
//! | UnsupportedResource | 400 | not-supported |
//! | NotFound | 404 | not-found |
//! | MethodNotAllowed | 405 | not-supported |
//! | DeleteConflict | 409 | conflict |
//! | PayloadTooLarge | 413 | too-costly |
//! | UnsupportedMediaType | 415 | not-supported |
//! | Internal | 500 | exception |

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::responses::operation_outcome::{IssueType, OperationOutcomeBuilder};
use crate::version::FhirBase;

/// The primary error type for controller operations.
#[derive(Debug, Clone, PartialEq)]
pub enum RestError {
    /// A request parameter or the body failed validation (HTTP 400).
    InvalidParameter {
        /// Error message.
        message: String,
        /// Base of the request.
        base: FhirBase,
    },

    /// The service failed (HTTP 500).
    Internal {
        /// Error message.
        message: String,
        /// Base of the request.
        base: FhirBase,
    },

    /// The requested resource or version does not exist (HTTP 404).
    NotFound {
        /// Error message.
        message: String,
        /// Base of the request.
        base: FhirBase,
    },

    /// A delete conflicts with current state (HTTP 409).
    DeleteConflict {
        /// Error message.
        message: String,
        /// Base of the request.
        base: FhirBase,
    },

    /// The interaction is not allowed (HTTP 405).
    MethodNotAllowed {
        /// Error message.
        message: String,
        /// Base of the request.
        base: FhirBase,
    },

    /// No descriptor is registered for the resource in this base (HTTP 400).
    UnsupportedResource {
        /// The resource type.
        resource_type: String,
        /// Base of the request.
        base: FhirBase,
    },

    /// Malformed request outside any base (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// The request body exceeds the configured limit (HTTP 413).
    PayloadTooLarge {
        /// Error message.
        message: String,
    },

    /// Unsupported media type (HTTP 415).
    UnsupportedMediaType {
        /// The unsupported content type.
        content_type: String,
    },
}

impl RestError {
    /// Creates an internal error for `base`.
    pub fn internal(message: impl Into<String>, base: FhirBase) -> Self {
        RestError::Internal {
            message: message.into(),
            base,
        }
    }

    /// Creates an invalid-parameter error for `base`.
    pub fn invalid_parameter(message: impl Into<String>, base: FhirBase) -> Self {
        RestError::InvalidParameter {
            message: message.into(),
            base,
        }
    }

    /// Creates a not-found error for `base`.
    pub fn not_found(message: impl Into<String>, base: FhirBase) -> Self {
        RestError::NotFound {
            message: message.into(),
            base,
        }
    }

    /// Returns the base the error is scoped to, if any.
    pub fn base(&self) -> Option<FhirBase> {
        match self {
            RestError::InvalidParameter { base, .. }
            | RestError::Internal { base, .. }
            | RestError::NotFound { base, .. }
            | RestError::DeleteConflict { base, .. }
            | RestError::MethodNotAllowed { base, .. }
            | RestError::UnsupportedResource { base, .. } => Some(*base),
            RestError::BadRequest { .. }
            | RestError::PayloadTooLarge { .. }
            | RestError::UnsupportedMediaType { .. } => None,
        }
    }

    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RestError::InvalidParameter { .. }
            | RestError::UnsupportedResource { .. }
            | RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::DeleteConflict { .. } => StatusCode::CONFLICT,
            RestError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            RestError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    fn issue_type(&self) -> IssueType {
        match self {
            RestError::InvalidParameter { .. } | RestError::BadRequest { .. } => {
                IssueType::Invalid
            }
            RestError::Internal { .. } => IssueType::Exception,
            RestError::NotFound { .. } => IssueType::NotFound,
            RestError::DeleteConflict { .. } => IssueType::Conflict,
            RestError::PayloadTooLarge { .. } => IssueType::TooCostly,
            RestError::MethodNotAllowed { .. }
            | RestError::UnsupportedResource { .. }
            | RestError::UnsupportedMediaType { .. } => IssueType::NotSupported,
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::InvalidParameter { message, .. } => {
                write!(f, "Invalid parameter: {}", message)
            }
            RestError::Internal { message, .. } => write!(f, "Internal error: {}", message),
            RestError::NotFound { message, .. } => write!(f, "Not found: {}", message),
            RestError::DeleteConflict { message, .. } => {
                write!(f, "Delete conflict: {}", message)
            }
            RestError::MethodNotAllowed { message, .. } => {
                write!(f, "Method not allowed: {}", message)
            }
            RestError::UnsupportedResource {
                resource_type,
                base,
            } => write!(
                f,
                "Resource type {} is not supported in FHIR {}",
                resource_type,
                base.release()
            ),
            RestError::BadRequest { message } => write!(f, "Bad request: {}", message),
            RestError::PayloadTooLarge { message } => write!(f, "Payload too large: {}", message),
            RestError::UnsupportedMediaType { content_type } => {
                write!(f, "Unsupported media type: {}", content_type)
            }
        }
    }
}

impl std::error::Error for RestError {}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let details = match &self {
            RestError::InvalidParameter { message, .. }
            | RestError::Internal { message, .. }
            | RestError::NotFound { message, .. }
            | RestError::DeleteConflict { message, .. }
            | RestError::MethodNotAllowed { message, .. }
            | RestError::BadRequest { message }
            | RestError::PayloadTooLarge { message } => message.clone(),
            RestError::UnsupportedResource { .. } => self.to_string(),
            RestError::UnsupportedMediaType { content_type } => {
                format!("Content type '{}' is not supported", content_type)
            }
        };

        let outcome = OperationOutcomeBuilder::new()
            .error(self.issue_type(), details)
            .build();

        let content_type = self
            .base()
            .map(|base| base.content_type())
            .unwrap_or_else(|| "application/fhir+json".to_string());

        let mut response = (self.status(), Json(outcome)).into_response();
        if let Ok(value) = HeaderValue::from_str(&content_type) {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
        response
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::BadRequest {
            message: format!("Invalid JSON: {}", err),
        }
    }
}

/// Result type alias for controller operations.
pub type RestResult<T> = Result<T, RestError>;
