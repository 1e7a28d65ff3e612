//! Resource service contract.
//!
//! A service performs the storage side of every interaction for one
//! profile. Controllers hand it sanitized arguments and format whatever it
//! returns; they never look inside storage themselves.

pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::extractors::SanitizedArgs;
use crate::registry::ResourceInstance;
use crate::version::FhirBase;

/// Errors a service may reject an interaction with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The target resource does not exist.
    #[error("resource not found: {resource_type}/{id}")]
    NotFound {
        /// The resource type.
        resource_type: String,
        /// The resource id.
        id: String,
    },

    /// The target resource was deleted.
    #[error("resource deleted: {resource_type}/{id}")]
    Gone {
        /// The resource type.
        resource_type: String,
        /// The resource id.
        id: String,
    },

    /// The interaction conflicts with current state (e.g. resource in use).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The interaction is not permitted on this resource.
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Any other storage failure.
    #[error("{0}")]
    Internal(String),

    /// The service failed without saying why.
    #[error("unspecified service failure")]
    Unspecified,
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Arguments of a create or update.
#[derive(Debug, Clone)]
pub struct WriteArgs {
    /// FHIR base of the request.
    pub base: FhirBase,
    /// Logical id: `resource_id` for create, the path id for update.
    pub id: Option<String>,
    /// The constructed resource.
    pub resource: ResourceInstance,
}

/// Result of a create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Logical id of the written resource.
    pub id: String,
    /// Version id assigned by the write, if the service versions resources.
    pub version_id: Option<String>,
    /// True when the write created the resource.
    pub created: bool,
}

/// Storage operations backing one profile.
#[async_trait]
pub trait ResourceService: Send + Sync {
    /// Returns a short name for logging.
    fn name(&self) -> &'static str;

    /// Searches resources of the profile's type.
    async fn search(&self, args: &SanitizedArgs) -> ServiceResult<Vec<Value>>;

    /// Reads the current version of `args.id`.
    async fn search_by_id(&self, args: &SanitizedArgs) -> ServiceResult<Option<Value>>;

    /// Reads version `args.version_id` of `args.id`.
    async fn search_by_version_id(&self, args: &SanitizedArgs) -> ServiceResult<Option<Value>>;

    /// Creates a resource.
    async fn create(&self, args: WriteArgs) -> ServiceResult<WriteOutcome>;

    /// Updates (or creates) a resource.
    async fn update(&self, args: WriteArgs) -> ServiceResult<WriteOutcome>;

    /// Deletes `args.id`.
    async fn remove(&self, args: &SanitizedArgs) -> ServiceResult<()>;

    /// Returns the history of every resource of the type.
    async fn history(&self, args: &SanitizedArgs) -> ServiceResult<Vec<Value>>;

    /// Returns the history of `args.id`.
    async fn history_by_id(&self, args: &SanitizedArgs) -> ServiceResult<Vec<Value>>;
}
