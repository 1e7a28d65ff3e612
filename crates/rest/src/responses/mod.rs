//! Response building for the profile controllers.
//!
//! - [`formatter`] - Service results to HTTP responses
//! - [`bundle`] - Bundle building
//! - [`headers`] - Response headers (ETag, Location, etc.)
//! - [`operation_outcome`] - OperationOutcome generation

pub mod bundle;
pub mod formatter;
pub mod headers;
pub mod operation_outcome;

pub use bundle::BundleBuilder;
pub use formatter::{BundleOptions, PageRequest};
pub use headers::ResourceHeaders;
pub use operation_outcome::OperationOutcomeBuilder;
