//! Sanitized request arguments.
//!
//! Collects everything a controller needs from the request (path ids, search
//! parameters and the JSON body) into one immutable [`SanitizedArgs`] value.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{Method, StatusCode, header},
};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::RestError;
use crate::version::FhirBase;

/// Maximum length of a FHIR logical id.
const MAX_ID_LENGTH: usize = 64;

/// Validated arguments of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedArgs {
    /// FHIR base the request was routed under.
    pub base: FhirBase,
    /// Logical id from the path (`/{Type}/{id}`).
    pub id: Option<String>,
    /// Version id from the path (`/_history/{vid}`).
    pub version_id: Option<String>,
    /// Server-assigned id for a create.
    pub resource_id: Option<String>,
    /// Parsed JSON body.
    pub resource_body: Option<Value>,
    /// Remaining search parameters, in request order.
    pub params: Vec<(String, String)>,
}

impl SanitizedArgs {
    /// Creates empty arguments for `base`.
    pub fn new(base: FhirBase) -> Self {
        Self {
            base,
            id: None,
            version_id: None,
            resource_id: None,
            resource_body: None,
            params: Vec::new(),
        }
    }

    /// Sets the logical id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the version id.
    pub fn with_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    /// Sets the id a create should use.
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Sets the resource body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.resource_body = Some(body);
        self
    }

    /// Appends a search parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Returns the first value of a search parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the parsed `_count` parameter.
    pub fn count(&self) -> Option<usize> {
        self.param("_count").and_then(|v| v.parse().ok())
    }

    /// Returns the parsed `_offset` parameter.
    pub fn offset(&self) -> Option<usize> {
        self.param("_offset").and_then(|v| v.parse().ok())
    }

    /// Returns the `resourceType` the body claims, if any.
    pub fn body_resource_type(&self) -> Option<&str> {
        self.resource_body
            .as_ref()
            .and_then(|b| b.get("resourceType"))
            .and_then(|v| v.as_str())
    }
}

/// Returns true if `id` is a valid FHIR logical id.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LENGTH
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

/// Body encodings the extractor understands.
enum BodyKind {
    Json,
    Form,
}

fn body_kind(content_type: Option<&str>) -> Result<BodyKind, RestError> {
    let Some(content_type) = content_type else {
        return Ok(BodyKind::Json);
    };

    let parsed: mime::Mime = content_type
        .parse()
        .map_err(|_| RestError::UnsupportedMediaType {
            content_type: content_type.to_string(),
        })?;

    if parsed.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        Ok(BodyKind::Form)
    } else if parsed.subtype() == mime::JSON || parsed.suffix() == Some(mime::JSON) {
        Ok(BodyKind::Json)
    } else {
        Err(RestError::UnsupportedMediaType {
            content_type: content_type.to_string(),
        })
    }
}

impl<S> FromRequest<S> for SanitizedArgs
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let base = parts
            .extensions
            .get::<FhirBase>()
            .copied()
            .ok_or_else(|| RestError::BadRequest {
                message: "Request was not routed under a FHIR base".to_string(),
            })?;

        let path = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map(|Path(p)| p)
            .unwrap_or_default();

        let Query(mut params) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|e| RestError::invalid_parameter(e.body_text(), base))?;

        let id = path.get("id").cloned();
        let version_id = path.get("version_id").cloned();
        for (name, value) in [("id", &id), ("version_id", &version_id)] {
            if let Some(value) = value {
                if !is_valid_id(value) {
                    return Err(RestError::invalid_parameter(
                        format!("'{}' has an invalid value '{}'", name, value),
                        base,
                    ));
                }
            }
        }

        let method = parts.method.clone();
        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = Bytes::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(|e| {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    RestError::PayloadTooLarge {
                        message: e.body_text(),
                    }
                } else {
                    RestError::BadRequest {
                        message: e.body_text(),
                    }
                }
            })?;

        let mut resource_body = None;
        if !bytes.is_empty() {
            match body_kind(content_type.as_deref())? {
                BodyKind::Form => {
                    params.extend(url::form_urlencoded::parse(&bytes[..]).into_owned());
                }
                BodyKind::Json => {
                    let value: Value = serde_json::from_slice(&bytes)?;
                    resource_body = Some(value);
                }
            }
        }

        let resource_id = if method == Method::POST && resource_body.is_some() {
            Some(Uuid::new_v4().to_string())
        } else {
            None
        };

        debug!(
            base = %base,
            id = ?id,
            version_id = ?version_id,
            params = params.len(),
            "Sanitized request arguments"
        );

        Ok(SanitizedArgs {
            base,
            id,
            version_id,
            resource_id,
            resource_body,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde_json::json;

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("abc-123.x"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("has space"));
        assert!(!is_valid_id("slash/id"));
        assert!(!is_valid_id(&"a".repeat(65)));
        assert!(is_valid_id(&"a".repeat(64)));
    }

    #[test]
    fn test_param_helpers() {
        let args = SanitizedArgs::new(FhirBase::R4)
            .with_param("_count", "5")
            .with_param("_offset", "x")
            .with_param("status", "completed")
            .with_param("status", "stopped");

        assert_eq!(args.count(), Some(5));
        assert_eq!(args.offset(), None);
        assert_eq!(args.param("status"), Some("completed"));
        assert_eq!(args.param("missing"), None);
    }

    #[test]
    fn test_body_resource_type() {
        let args = SanitizedArgs::new(FhirBase::R4).with_body(json!({"resourceType": "Media"}));
        assert_eq!(args.body_resource_type(), Some("Media"));
        assert_eq!(SanitizedArgs::new(FhirBase::R4).body_resource_type(), None);
    }

    #[tokio::test]
    async fn test_extract_json_create() {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/4_0_0/Media?_format=json")
            .header(header::CONTENT_TYPE, "application/fhir+json")
            .body(Body::from(r#"{"resourceType":"Media"}"#))
            .unwrap();
        req.extensions_mut().insert(FhirBase::R4);

        let args = SanitizedArgs::from_request(req, &()).await.unwrap();
        assert_eq!(args.base, FhirBase::R4);
        assert_eq!(args.body_resource_type(), Some("Media"));
        assert!(args.resource_id.is_some());
        assert_eq!(args.param("_format"), Some("json"));
    }

    #[tokio::test]
    async fn test_extract_form_search() {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/4_0_0/Media/_search")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("_id=m1&_count=2"))
            .unwrap();
        req.extensions_mut().insert(FhirBase::R4);

        let args = SanitizedArgs::from_request(req, &()).await.unwrap();
        assert_eq!(args.param("_id"), Some("m1"));
        assert_eq!(args.count(), Some(2));
        assert!(args.resource_body.is_none());
        assert!(args.resource_id.is_none());
    }

    #[tokio::test]
    async fn test_extract_rejects_unsupported_media_type() {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/4_0_0/Media")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap();
        req.extensions_mut().insert(FhirBase::R4);

        let err = SanitizedArgs::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, RestError::UnsupportedMediaType { .. }));
    }

    #[tokio::test]
    async fn test_extract_requires_base() {
        let req = Request::builder().uri("/Media").body(Body::empty()).unwrap();
        let err = SanitizedArgs::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, RestError::BadRequest { .. }));
    }
}
