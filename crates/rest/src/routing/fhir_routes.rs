//! FHIR route configuration.
//!
//! Every enabled profile is mounted once per FHIR base it supports. Each
//! mounted router carries the base as a request extension, which the
//! [`SanitizedArgs`](crate::extractors::SanitizedArgs) extractor reads.

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tracing::info;

use crate::controller::ResourceController;
use crate::handlers;
use crate::profiles::ProfileConfig;
use crate::registry::ResourceResolver;
use crate::state::AppState;
use crate::version::FhirBase;

/// Creates the routes of one profile under one base.
///
/// # Routes
///
/// - `GET /{base}/{Type}` - Search
/// - `POST /{base}/{Type}` - Create
/// - `POST /{base}/{Type}/_search` - Search (form body)
/// - `GET /{base}/{Type}/_history` - Type history
/// - `GET /{base}/{Type}/{id}` - Read
/// - `PUT /{base}/{Type}/{id}` - Update
/// - `DELETE /{base}/{Type}/{id}` - Delete
/// - `GET /{base}/{Type}/{id}/_history` - Instance history
/// - `GET /{base}/{Type}/{id}/_history/{version_id}` - Version read
pub fn profile_routes(controller: Arc<ResourceController>, base: FhirBase) -> Router {
    let prefix = format!("/{}/{}", base, controller.resource_type());

    Router::new()
        .route(
            &prefix,
            get(handlers::search_handler).post(handlers::create_handler),
        )
        .route(
            &format!("{}/_search", prefix),
            post(handlers::search_handler),
        )
        .route(
            &format!("{}/_history", prefix),
            get(handlers::history_handler),
        )
        .route(
            &format!("{}/{{id}}", prefix),
            get(handlers::search_by_id_handler)
                .put(handlers::update_handler)
                .delete(handlers::remove_handler),
        )
        .route(
            &format!("{}/{{id}}/_history", prefix),
            get(handlers::history_by_id_handler),
        )
        .route(
            &format!("{}/{{id}}/_history/{{version_id}}", prefix),
            get(handlers::search_by_version_id_handler),
        )
        .with_state(controller)
        .layer(Extension(base))
}

/// Creates all routes: `/health`, `/{base}/metadata` for every mounted base
/// and the interactions of every enabled profile.
pub fn create_routes(state: AppState) -> Router {
    let resolver: Arc<dyn ResourceResolver> = state.registry().clone();
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/_liveness", get(handlers::liveness_handler))
        .with_state(state.clone());

    for base in state.mounted_bases() {
        router = router.merge(
            Router::new()
                .route(&format!("/{}/metadata", base), get(handlers::capabilities_handler))
                .with_state(state.clone())
                .layer(Extension(base)),
        );
    }

    for profile in state.profiles() {
        router = router.merge(mount_profile(profile, &resolver, &state));
    }

    router
}

fn mount_profile(
    profile: &ProfileConfig,
    resolver: &Arc<dyn ResourceResolver>,
    state: &AppState,
) -> Router {
    let controller = Arc::new(ResourceController::new(
        profile.definition(),
        Arc::clone(profile.service()),
        Arc::clone(resolver),
        Arc::clone(state.config()),
    ));

    let mut router = Router::new();
    for base in profile.mounted_versions(&**resolver) {
        info!(
            resource_type = profile.resource_type(),
            base = %base,
            service = profile.service().name(),
            "Mounting profile"
        );
        router = router.merge(profile_routes(Arc::clone(&controller), base));
    }
    router
}
