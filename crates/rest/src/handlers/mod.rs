//! HTTP request handlers.
//!
//! - [`resource`] - Profile interactions, forwarded to a controller
//! - [`capabilities`] - Server capabilities (CapabilityStatement) per base
//! - [`health`] - Health check endpoint

pub mod capabilities;
pub mod health;
pub mod resource;

pub use capabilities::capabilities_handler;
pub use health::{health_handler, liveness_handler};
pub use resource::{
    create_handler, history_by_id_handler, history_handler, remove_handler,
    search_by_id_handler, search_by_version_id_handler, search_handler, update_handler,
};
