//! FHIR base versions served by the profile controllers.
//!
//! Every profile route is mounted under a base segment such as `/4_0_0/Media`.
//! The segment selects which resource descriptor applies to the request.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A FHIR specification release a profile can be served under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FhirBase {
    /// FHIR DSTU2 (1.0.2)
    Dstu2,
    /// FHIR STU3 (3.0.1)
    Stu3,
    /// FHIR R4 (4.0.0)
    R4,
}

/// Error returned when a string does not name a supported base version.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported FHIR base version: {0}")]
pub struct UnknownFhirBase(pub String);

impl FhirBase {
    /// All supported bases, oldest first.
    pub const ALL: [FhirBase; 3] = [FhirBase::Dstu2, FhirBase::Stu3, FhirBase::R4];

    /// Returns the URL path segment for this base (e.g. `4_0_0`).
    pub fn as_str(&self) -> &'static str {
        match self {
            FhirBase::Dstu2 => "1_0_2",
            FhirBase::Stu3 => "3_0_1",
            FhirBase::R4 => "4_0_0",
        }
    }

    /// Returns the dotted FHIR version used in `fhirVersion` parameters.
    pub fn fhir_version(&self) -> &'static str {
        match self {
            FhirBase::Dstu2 => "1.0.2",
            FhirBase::Stu3 => "3.0.1",
            FhirBase::R4 => "4.0.0",
        }
    }

    /// Returns the release name.
    pub fn release(&self) -> &'static str {
        match self {
            FhirBase::Dstu2 => "DSTU2",
            FhirBase::Stu3 => "STU3",
            FhirBase::R4 => "R4",
        }
    }

    /// Returns the `Content-Type` used for resources of this base.
    pub fn content_type(&self) -> String {
        format!("application/fhir+json; fhirVersion={}", self.fhir_version())
    }
}

impl Default for FhirBase {
    fn default() -> Self {
        FhirBase::R4
    }
}

impl fmt::Display for FhirBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FhirBase {
    type Err = UnknownFhirBase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1_0_2" | "1.0.2" | "dstu2" => Ok(FhirBase::Dstu2),
            "3_0_1" | "3.0.1" | "3_0_2" | "3.0.2" | "stu3" => Ok(FhirBase::Stu3),
            "4_0_0" | "4.0.0" | "4_0_1" | "4.0.1" | "r4" => Ok(FhirBase::R4),
            _ => Err(UnknownFhirBase(s.to_string())),
        }
    }
}
