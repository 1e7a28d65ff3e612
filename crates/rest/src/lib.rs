//! # helios-profiles - FHIR profile controllers
//!
//! HTTP controllers for three FHIR profiles: **Media**,
//! **MedicationAdministration** and **MessageDefinition**, served under the
//! DSTU2 (`1_0_2`), STU3 (`3_0_1`) and R4 (`4_0_0`) bases.
//!
//! A single generic [`ResourceController`] is instantiated per profile. Each
//! interaction resolves the resource descriptor for the request's base from
//! the [`ResourceRegistry`], validates `resourceType` on writes, awaits one
//! call on the profile's [`ResourceService`] and formats the result.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use helios_profiles::{ServerConfig, create_app_with_config, in_memory_profiles};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let profiles = in_memory_profiles(&config)?;
//!     let app = create_app_with_config(profiles, config);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Interaction | HTTP Method | URL Pattern |
//! |------------|-------------|-------------|
//! | search | GET/POST | `/[base]/[type]?params` or `/[base]/[type]/_search` |
//! | searchById | GET | `/[base]/[type]/[id]` |
//! | searchByVersionId | GET | `/[base]/[type]/[id]/_history/[vid]` |
//! | create | POST | `/[base]/[type]` |
//! | update | PUT | `/[base]/[type]/[id]` |
//! | remove | DELETE | `/[base]/[type]/[id]` |
//! | history | GET | `/[base]/[type]/_history` |
//! | historyById | GET | `/[base]/[type]/[id]/_history` |
//! | capabilities | GET | `/[base]/metadata` |
//! | health | GET | `/health` |
//!
//! ## Error Handling
//!
//! Errors are returned as FHIR OperationOutcome resources; see [`error`] for
//! the status mapping.
//!
//! ## Architecture
//!
//! - [`version`] - FHIR base versions
//! - [`registry`] - Resource descriptors per base
//! - [`profiles`] - Profile table and enabled profile configuration
//! - [`service`] - Service contract and the in-memory service
//! - [`controller`] - The generic controller
//! - [`extractors`] - Sanitized request arguments
//! - [`responses`] - Response formatting
//! - [`handlers`] - Axum handlers
//! - [`routing`] - Route configuration
//! - [`config`] - Server configuration
//! - [`error`] - Error types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod controller;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod profiles;
pub mod registry;
pub mod responses;
pub mod routing;
pub mod service;
pub mod state;
pub mod version;

pub use config::ServerConfig;
pub use controller::ResourceController;
pub use error::{RestError, RestResult};
pub use extractors::SanitizedArgs;
pub use profiles::{ProfileConfig, ProfileDefinition};
pub use registry::{ResourceDescriptor, ResourceRegistry, ResourceResolver};
pub use service::{ResourceService, ServiceError, ServiceResult, WriteArgs, WriteOutcome};
pub use state::AppState;
pub use version::FhirBase;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::service::memory::InMemoryService;

/// Builds an in-memory backed [`ProfileConfig`] for every profile the
/// configuration enables.
pub fn in_memory_profiles(config: &ServerConfig) -> Result<Vec<ProfileConfig>, String> {
    let versions = config.enabled_versions()?;
    Ok(config
        .enabled_profiles()?
        .into_iter()
        .map(|definition| {
            ProfileConfig::new(
                definition,
                Arc::new(InMemoryService::new(definition.resource_type)),
                versions.iter().copied(),
            )
        })
        .collect())
}

/// Creates the Axum application with default configuration.
pub fn create_app(profiles: Vec<ProfileConfig>) -> Router {
    create_app_with_config(profiles, ServerConfig::default())
}

/// Creates the Axum application with custom configuration and the standard
/// resource registry.
pub fn create_app_with_config(profiles: Vec<ProfileConfig>, config: ServerConfig) -> Router {
    create_app_with_registry(ResourceRegistry::standard(), profiles, config)
}

/// Creates the Axum application with a custom registry.
pub fn create_app_with_registry(
    registry: ResourceRegistry,
    profiles: Vec<ProfileConfig>,
    config: ServerConfig,
) -> Router {
    info!(
        profiles = profiles.len(),
        descriptors = registry.len(),
        "Creating profile server"
    );

    let state = AppState::new(Arc::new(registry), Arc::new(config.clone()), profiles);
    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(service_builder)
}

fn parse_list<T: std::str::FromStr>(value: &str) -> Vec<T> {
    value
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    cors = if config.cors_origins == "*" {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(parse_list::<axum::http::HeaderValue>(&config.cors_origins))
    };

    cors = if config.cors_methods == "*" {
        cors.allow_methods(Any)
    } else {
        cors.allow_methods(parse_list::<axum::http::Method>(&config.cors_methods))
    };

    if config.cors_headers == "*" {
        cors.allow_headers(Any)
    } else {
        cors.allow_headers(parse_list::<axum::http::HeaderName>(&config.cors_headers))
    }
}

/// Initializes the tracing subscriber for logging.
///
/// Call once at application startup. `RUST_LOG` overrides `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("helios_profiles={},hfs={},tower_http=debug", level, level))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
