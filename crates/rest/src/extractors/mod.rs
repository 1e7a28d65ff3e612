//! Axum extractors for controller arguments.
//!
//! - [`SanitizedArgs`] - Validated ids, search parameters and body of a request

mod sanitized_args;

pub use sanitized_args::{SanitizedArgs, is_valid_id};
