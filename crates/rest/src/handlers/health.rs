//! Health check endpoint handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// # HTTP Request
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with the mounted profiles and their bases.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    debug!("Processing health check request");

    let profiles: Vec<_> = state
        .profiles()
        .iter()
        .map(|p| {
            let versions: Vec<_> = p
                .mounted_versions(&**state.registry())
                .iter()
                .map(|base| base.as_str())
                .collect();
            json!({
                "resourceType": p.resource_type(),
                "service": p.service().name(),
                "versions": versions
            })
        })
        .collect();

    let body = json!({
        "status": "healthy",
        "profiles": profiles,
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    (StatusCode::OK, Json(body)).into_response()
}

/// Handler for a liveness probe.
///
/// `GET /_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}
