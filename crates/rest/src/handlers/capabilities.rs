//! Capabilities (CapabilityStatement) handler.
//!
//! Implements the FHIR [capabilities interaction](https://hl7.org/fhir/http.html#capabilities):
//! `GET [base]/metadata`. The statement lists the profiles mounted under the
//! requested base.

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::state::AppState;
use crate::version::FhirBase;

/// Interactions every profile supports.
const RESOURCE_INTERACTIONS: [&str; 7] = [
    "read",
    "vread",
    "update",
    "delete",
    "history-instance",
    "history-type",
    "create",
];

/// Handler for the capabilities interaction.
pub async fn capabilities_handler(
    State(state): State<AppState>,
    Extension(base): Extension<FhirBase>,
) -> RestResult<Response> {
    debug!(base = %base, "Processing capabilities request");

    let statement = build_capability_statement(&state, base);

    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&base.content_type())
        .map_err(|e| RestError::internal(e.to_string(), base))?;
    headers.insert(header::CONTENT_TYPE, content_type);

    Ok((StatusCode::OK, headers, Json(statement)).into_response())
}

fn build_capability_statement(state: &AppState, base: FhirBase) -> Value {
    let resources: Vec<Value> = state
        .mounted_profiles(base)
        .iter()
        .map(|p| build_resource_capability(p.resource_type()))
        .collect();

    json!({
        "resourceType": "CapabilityStatement",
        "status": "active",
        "date": chrono::Utc::now().to_rfc3339(),
        "kind": "instance",
        "fhirVersion": base.fhir_version(),
        "format": ["json", "application/fhir+json"],
        "implementation": {
            "description": "Helios FHIR profile server",
            "url": format!("{}/{}", state.config().full_base_url(), base)
        },
        "rest": [{
            "mode": "server",
            "security": {
                "cors": state.config().enable_cors
            },
            "resource": resources
        }]
    })
}

fn build_resource_capability(resource_type: &str) -> Value {
    let mut interactions: Vec<Value> = RESOURCE_INTERACTIONS
        .iter()
        .map(|code| json!({ "code": code }))
        .collect();
    interactions.push(json!({ "code": "search-type" }));

    json!({
        "type": resource_type,
        "profile": format!("http://hl7.org/fhir/StructureDefinition/{}", resource_type),
        "interaction": interactions,
        "versioning": "versioned",
        "readHistory": true,
        "updateCreate": true,
        "searchParam": [{
            "name": "_id",
            "type": "token",
            "documentation": "Logical id of this artifact"
        }]
    })
}
