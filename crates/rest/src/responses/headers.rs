//! Response header generation.

use axum::http::{HeaderMap, HeaderValue, header};
use chrono::DateTime;
use serde_json::Value;

use crate::version::FhirBase;

/// Builder for resource response headers.
///
/// Produces `Content-Type`, `ETag`, `Last-Modified` and `Location`.
#[derive(Debug)]
pub struct ResourceHeaders {
    content_type: String,
    etag: Option<String>,
    last_modified: Option<String>,
    location: Option<String>,
}

impl ResourceHeaders {
    /// Creates headers carrying the content type of `base`.
    pub fn new(base: FhirBase) -> Self {
        Self {
            content_type: base.content_type(),
            etag: None,
            last_modified: None,
            location: None,
        }
    }

    /// Creates headers from a resource's `meta`.
    pub fn from_resource(resource: &Value, base: FhirBase) -> Self {
        let mut headers = Self::new(base);
        let meta = resource.get("meta");

        if let Some(version_id) = meta
            .and_then(|m| m.get("versionId"))
            .and_then(Value::as_str)
        {
            headers = headers.with_version(version_id);
        }

        if let Some(last_updated) = meta
            .and_then(|m| m.get("lastUpdated"))
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        {
            headers.last_modified = Some(
                last_updated
                    .with_timezone(&chrono::Utc)
                    .format("%a, %d %b %Y %H:%M:%S GMT")
                    .to_string(),
            );
        }

        headers
    }

    /// Sets the ETag from a version ID.
    pub fn with_version(mut self, version_id: &str) -> Self {
        self.etag = Some(format!("W/\"{}\"", version_id));
        self
    }

    /// Sets the Location URL.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Returns the ETag value.
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// Returns the Last-Modified value.
    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    /// Returns the Location value.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Converts to an axum HeaderMap, skipping values that are not valid
    /// header text.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.content_type) {
            headers.insert(header::CONTENT_TYPE, value);
        }

        let optional = [
            (header::ETAG, &self.etag),
            (header::LAST_MODIFIED, &self.last_modified),
            (header::LOCATION, &self.location),
        ];
        for (name, value) in optional {
            if let Some(value) = value.as_deref().and_then(|v| HeaderValue::from_str(v).ok()) {
                headers.insert(name, value);
            }
        }

        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_uses_base_content_type() {
        let map = ResourceHeaders::new(FhirBase::Dstu2).to_header_map();
        assert_eq!(
            map[header::CONTENT_TYPE],
            "application/fhir+json; fhirVersion=1.0.2"
        );
        assert!(!map.contains_key(header::ETAG));
    }

    #[test]
    fn test_from_resource_meta() {
        let resource = json!({
            "resourceType": "Media",
            "id": "m1",
            "meta": {"versionId": "3", "lastUpdated": "2024-01-02T03:04:05Z"}
        });

        let headers = ResourceHeaders::from_resource(&resource, FhirBase::R4);
        assert_eq!(headers.etag(), Some("W/\"3\""));
        assert_eq!(headers.last_modified(), Some("Tue, 02 Jan 2024 03:04:05 GMT"));
    }

    #[test]
    fn test_from_resource_without_meta() {
        let headers = ResourceHeaders::from_resource(&json!({"id": "x"}), FhirBase::R4);
        assert_eq!(headers.etag(), None);
        assert_eq!(headers.last_modified(), None);
    }

    #[test]
    fn test_to_header_map_with_location() {
        let map = ResourceHeaders::new(FhirBase::R4)
            .with_version("1")
            .with_location("http://localhost:8080/4_0_0/Media/m1/_history/1")
            .to_header_map();

        assert_eq!(map[header::ETAG], "W/\"1\"");
        assert_eq!(
            map[header::LOCATION],
            "http://localhost:8080/4_0_0/Media/m1/_history/1"
        );
    }
}
