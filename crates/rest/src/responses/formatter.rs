//! Response formatting for controller results.
//!
//! Turns raw service results into HTTP responses: bundles for search and
//! history, single resources for read and vread, acknowledgements for
//! writes and deletes. Delete rejections have their own status mapping.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use url::form_urlencoded;

use crate::error::{RestError, RestResult};
use crate::responses::bundle::{BundleBuilder, BundleEntry, BundleType};
use crate::responses::headers::ResourceHeaders;
use crate::service::{ServiceError, WriteOutcome};
use crate::version::FhirBase;

/// Paging window applied to a search bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// URL the paging links are built on (e.g. `http://host/4_0_0/Media`).
    pub link_base: String,
    /// Search parameters to carry into the links, without `_count`/`_offset`.
    pub params: Vec<(String, String)>,
    /// Page size.
    pub count: usize,
    /// Index of the first entry of the page.
    pub offset: usize,
}

impl PageRequest {
    fn link(&self, offset: usize) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.params {
            query.append_pair(name, value);
        }
        query.append_pair("_count", &self.count.to_string());
        query.append_pair("_offset", &offset.to_string());
        format!("{}?{}", self.link_base, query.finish())
    }
}

/// How a bundle response is shaped.
#[derive(Debug, Clone)]
pub struct BundleOptions<'a> {
    bundle_type: BundleType,
    resource_type: &'a str,
    resource_url: Option<&'a str>,
    page: Option<PageRequest>,
}

impl<'a> BundleOptions<'a> {
    /// Options for a searchset bundle of `resource_type`.
    pub fn search(resource_type: &'a str) -> Self {
        Self {
            bundle_type: BundleType::Searchset,
            resource_type,
            resource_url: None,
            page: None,
        }
    }

    /// Options for a history bundle of `resource_type`.
    pub fn history(resource_type: &'a str) -> Self {
        Self {
            bundle_type: BundleType::History,
            resource_type,
            resource_url: None,
            page: None,
        }
    }

    /// Sets the resource server URL entries get their `fullUrl` under.
    pub fn with_resource_url(mut self, resource_url: Option<&'a str>) -> Self {
        self.resource_url = resource_url;
        self
    }

    /// Sets the paging window.
    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }
}

/// Builds a Bundle response from search or history results.
pub fn bundle_read_response(
    base: FhirBase,
    results: Vec<Value>,
    options: BundleOptions<'_>,
) -> Response {
    let total = results.len();
    let search_match = options.bundle_type == BundleType::Searchset;
    let mut builder = BundleBuilder::new(options.bundle_type);

    let window: Vec<Value> = match &options.page {
        Some(page) => {
            builder = builder.link("self", page.link(page.offset));
            if page.offset > 0 {
                builder = builder.link("previous", page.link(page.offset.saturating_sub(page.count)));
            }
            let next = page.offset.saturating_add(page.count);
            if next < total {
                builder = builder.link("next", page.link(next));
            }
            results.into_iter().skip(page.offset).take(page.count).collect()
        }
        None => results,
    };

    for resource in window {
        let full_url = options.resource_url.and_then(|url| {
            resource
                .get("id")
                .and_then(Value::as_str)
                .map(|id| format!("{}/{}/{}", url, options.resource_type, id))
        });
        builder = builder.add_entry(BundleEntry {
            full_url,
            resource,
            search_match,
        });
    }

    let bundle = builder.total(total).build();
    (
        StatusCode::OK,
        ResourceHeaders::new(base).to_header_map(),
        Json(bundle),
    )
        .into_response()
}

/// Builds the response for a read of `{resource_type}/{id}`.
pub fn single_read_response(
    base: FhirBase,
    resource_type: &str,
    id: &str,
    resource: Option<Value>,
) -> RestResult<Response> {
    let resource = resource.ok_or_else(|| {
        RestError::not_found(format!("{}/{} not found", resource_type, id), base)
    })?;

    let headers = ResourceHeaders::from_resource(&resource, base);
    Ok((StatusCode::OK, headers.to_header_map(), Json(resource)).into_response())
}

/// Builds the response for a version read.
///
/// A resource whose `meta.versionId` differs from the requested version is
/// treated as not found.
pub fn single_vread_response(
    base: FhirBase,
    resource_type: &str,
    id: &str,
    version_id: &str,
    resource: Option<Value>,
) -> RestResult<Response> {
    let not_found = || {
        RestError::not_found(
            format!("{}/{}/_history/{} not found", resource_type, id, version_id),
            base,
        )
    };

    let resource = resource.ok_or_else(not_found)?;
    let stored_version = resource
        .get("meta")
        .and_then(|m| m.get("versionId"))
        .and_then(Value::as_str);
    if stored_version.is_some_and(|v| v != version_id) {
        return Err(not_found());
    }

    let headers = ResourceHeaders::from_resource(&resource, base);
    Ok((StatusCode::OK, headers.to_header_map(), Json(resource)).into_response())
}

fn write_response(
    status: StatusCode,
    base: FhirBase,
    resource_type: &str,
    base_url: &str,
    outcome: &WriteOutcome,
) -> Response {
    let mut location = format!("{}/{}/{}/{}", base_url, base, resource_type, outcome.id);
    let mut headers = ResourceHeaders::new(base);
    if let Some(version_id) = &outcome.version_id {
        location.push_str(&format!("/_history/{}", version_id));
        headers = headers.with_version(version_id);
    }

    let mut map = headers.with_location(location).to_header_map();
    map.remove(header::CONTENT_TYPE);
    (status, map).into_response()
}

/// Builds the acknowledgement of a create: 201 with `Location` and `ETag`.
pub fn create_response(
    base: FhirBase,
    resource_type: &str,
    base_url: &str,
    outcome: &WriteOutcome,
) -> Response {
    write_response(StatusCode::CREATED, base, resource_type, base_url, outcome)
}

/// Builds the acknowledgement of an update: 201 when the update created the
/// resource, 200 otherwise.
pub fn update_response(
    base: FhirBase,
    resource_type: &str,
    base_url: &str,
    outcome: &WriteOutcome,
) -> Response {
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    write_response(status, base, resource_type, base_url, outcome)
}

/// Builds the acknowledgement of a delete.
pub fn delete_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Maps a delete rejection to the error returned to the client.
pub fn delete_rejection(err: ServiceError, base: FhirBase) -> RestError {
    match err {
        ServiceError::Conflict(message) => RestError::DeleteConflict { message, base },
        ServiceError::MethodNotAllowed(message) => RestError::MethodNotAllowed { message, base },
        err @ (ServiceError::NotFound { .. } | ServiceError::Gone { .. }) => {
            RestError::not_found(err.to_string(), base)
        }
        err @ (ServiceError::Internal(_) | ServiceError::Unspecified) => {
            RestError::internal(err.to_string(), base)
        }
    }
}
