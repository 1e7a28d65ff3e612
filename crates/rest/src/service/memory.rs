//! In-memory resource service.
//!
//! A versioned store kept per FHIR base. Deletes push a tombstone version,
//! so earlier versions stay readable and version ids keep counting when a
//! deleted id is written again. History lists live versions only. Search
//! understands `_id` only.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{ResourceService, ServiceError, ServiceResult, WriteArgs, WriteOutcome};
use crate::extractors::SanitizedArgs;
use crate::version::FhirBase;

#[derive(Debug, Clone)]
struct StoredVersion {
    version_id: u64,
    resource: Value,
    deleted: bool,
}

type Store = HashMap<FhirBase, HashMap<String, Vec<StoredVersion>>>;

/// Versioned in-memory storage for one resource type.
#[derive(Debug)]
pub struct InMemoryService {
    resource_type: &'static str,
    store: RwLock<Store>,
}

impl InMemoryService {
    /// Creates an empty store for `resource_type`.
    pub fn new(resource_type: &'static str) -> Self {
        Self {
            resource_type,
            store: RwLock::new(HashMap::new()),
        }
    }

    fn required_id<'a>(&self, id: Option<&'a str>) -> ServiceResult<&'a str> {
        id.ok_or_else(|| {
            ServiceError::Internal(format!("{} interaction requires an id", self.resource_type))
        })
    }

    fn not_found(&self, id: &str) -> ServiceError {
        ServiceError::NotFound {
            resource_type: self.resource_type.to_string(),
            id: id.to_string(),
        }
    }

    fn stamp(mut resource: Value, version_id: u64) -> Value {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        match resource.get_mut("meta").and_then(Value::as_object_mut) {
            Some(meta) => {
                meta.insert("versionId".to_string(), json!(version_id.to_string()));
                meta.insert("lastUpdated".to_string(), json!(now));
            }
            None => {
                resource["meta"] = json!({
                    "versionId": version_id.to_string(),
                    "lastUpdated": now,
                });
            }
        }
        resource
    }

    fn push_version(
        versions: &mut Vec<StoredVersion>,
        resource: Value,
        deleted: bool,
    ) -> u64 {
        let version_id = versions.last().map_or(1, |v| v.version_id + 1);
        versions.push(StoredVersion {
            version_id,
            resource: Self::stamp(resource, version_id),
            deleted,
        });
        version_id
    }

    fn current(versions: &[StoredVersion]) -> Option<&StoredVersion> {
        versions.last().filter(|v| !v.deleted)
    }
}

#[async_trait]
impl ResourceService for InMemoryService {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn search(&self, args: &SanitizedArgs) -> ServiceResult<Vec<Value>> {
        let ids: Option<Vec<&str>> = args.param("_id").map(|v| v.split(',').collect());
        let store = self.store.read().await;
        let Some(resources) = store.get(&args.base) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<(&String, Value)> = resources
            .iter()
            .filter(|(id, _)| ids.as_ref().is_none_or(|ids| ids.contains(&id.as_str())))
            .filter_map(|(id, versions)| Self::current(versions).map(|v| (id, v.resource.clone())))
            .collect();
        matches.sort_by(|a, b| a.0.cmp(b.0));

        debug!(resource_type = self.resource_type, matches = matches.len(), "memory search");
        Ok(matches.into_iter().map(|(_, resource)| resource).collect())
    }

    async fn search_by_id(&self, args: &SanitizedArgs) -> ServiceResult<Option<Value>> {
        let id = self.required_id(args.id.as_deref())?;
        let store = self.store.read().await;
        Ok(store
            .get(&args.base)
            .and_then(|resources| resources.get(id))
            .and_then(|versions| Self::current(versions))
            .map(|v| v.resource.clone()))
    }

    async fn search_by_version_id(&self, args: &SanitizedArgs) -> ServiceResult<Option<Value>> {
        let id = self.required_id(args.id.as_deref())?;
        let version_id = args.version_id.as_deref().and_then(|v| v.parse::<u64>().ok());
        let store = self.store.read().await;
        Ok(store
            .get(&args.base)
            .and_then(|resources| resources.get(id))
            .and_then(|versions| {
                versions
                    .iter()
                    .find(|v| Some(v.version_id) == version_id && !v.deleted)
            })
            .map(|v| v.resource.clone()))
    }

    async fn create(&self, args: WriteArgs) -> ServiceResult<WriteOutcome> {
        let id = args.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut resource = args.resource;
        resource.set_id(id.clone());

        let mut store = self.store.write().await;
        let resources = store.entry(args.base).or_default();
        if resources.get(&id).and_then(|v| Self::current(v)).is_some() {
            return Err(ServiceError::Conflict(format!(
                "{}/{} already exists",
                self.resource_type, id
            )));
        }

        let versions = resources.entry(id.clone()).or_default();
        let version_id = Self::push_version(versions, resource.into_value(), false);
        debug!(resource_type = self.resource_type, id = %id, "memory create");

        Ok(WriteOutcome {
            id,
            version_id: Some(version_id.to_string()),
            created: true,
        })
    }

    async fn update(&self, args: WriteArgs) -> ServiceResult<WriteOutcome> {
        let id = self.required_id(args.id.as_deref())?.to_string();
        let mut resource = args.resource;
        resource.set_id(id.clone());

        let mut store = self.store.write().await;
        let versions = store
            .entry(args.base)
            .or_default()
            .entry(id.clone())
            .or_default();
        let created = Self::current(versions).is_none();
        let version_id = Self::push_version(versions, resource.into_value(), false);
        debug!(resource_type = self.resource_type, id = %id, created, "memory update");

        Ok(WriteOutcome {
            id,
            version_id: Some(version_id.to_string()),
            created,
        })
    }

    async fn remove(&self, args: &SanitizedArgs) -> ServiceResult<()> {
        let id = self.required_id(args.id.as_deref())?;
        let mut store = self.store.write().await;
        let versions = store
            .get_mut(&args.base)
            .and_then(|resources| resources.get_mut(id))
            .ok_or_else(|| self.not_found(id))?;

        let Some(current) = Self::current(versions) else {
            return Err(ServiceError::Gone {
                resource_type: self.resource_type.to_string(),
                id: id.to_string(),
            });
        };

        let tombstone = json!({
            "resourceType": self.resource_type,
            "id": id,
            "meta": current.resource.get("meta").cloned().unwrap_or_else(|| json!({})),
        });
        Self::push_version(versions, tombstone, true);
        debug!(resource_type = self.resource_type, id = %id, "memory remove");
        Ok(())
    }

    async fn history(&self, args: &SanitizedArgs) -> ServiceResult<Vec<Value>> {
        let store = self.store.read().await;
        let Some(resources) = store.get(&args.base) else {
            return Ok(Vec::new());
        };

        let mut ids: Vec<&String> = resources.keys().collect();
        ids.sort();
        Ok(ids
            .into_iter()
            .flat_map(move |id| resources[id].iter().rev())
            .filter(|v| !v.deleted)
            .map(|v| v.resource.clone())
            .collect())
    }

    async fn history_by_id(&self, args: &SanitizedArgs) -> ServiceResult<Vec<Value>> {
        let id = self.required_id(args.id.as_deref())?;
        let store = self.store.read().await;
        Ok(store
            .get(&args.base)
            .and_then(|resources| resources.get(id))
            .map(|versions| {
                versions
                    .iter()
                    .rev()
                    .filter(|v| !v.deleted)
                    .map(|v| v.resource.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ResourceRegistry, ResourceResolver};

    fn write_args(base: FhirBase, id: Option<&str>, body: Value) -> WriteArgs {
        let resource = ResourceRegistry::standard()
            .resolve(base, "Media")
            .unwrap()
            .construct(&body);
        WriteArgs {
            base,
            id: id.map(str::to_string),
            resource,
        }
    }

    fn media(status: &str) -> Value {
        json!({"resourceType": "Media", "status": status})
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let service = InMemoryService::new("Media");
        let outcome = service
            .create(write_args(FhirBase::R4, Some("m1"), media("completed")))
            .await
            .unwrap();
        assert_eq!(outcome.id, "m1");
        assert_eq!(outcome.version_id.as_deref(), Some("1"));
        assert!(outcome.created);

        let read = service
            .search_by_id(&SanitizedArgs::new(FhirBase::R4).with_id("m1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read["id"], "m1");
        assert_eq!(read["status"], "completed");
        assert_eq!(read["meta"]["versionId"], "1");

        let other_base = service
            .search_by_id(&SanitizedArgs::new(FhirBase::Stu3).with_id("m1"))
            .await
            .unwrap();
        assert!(other_base.is_none());
    }

    #[tokio::test]
    async fn test_create_existing_id_conflicts() {
        let service = InMemoryService::new("Media");
        service
            .create(write_args(FhirBase::R4, Some("m1"), media("completed")))
            .await
            .unwrap();
        let err = service
            .create(write_args(FhirBase::R4, Some("m1"), media("completed")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_versions_and_vread() {
        let service = InMemoryService::new("Media");
        let first = service
            .update(write_args(FhirBase::R4, Some("m1"), media("in-progress")))
            .await
            .unwrap();
        assert!(first.created);

        let second = service
            .update(write_args(FhirBase::R4, Some("m1"), media("completed")))
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.version_id.as_deref(), Some("2"));

        let v1 = service
            .search_by_version_id(
                &SanitizedArgs::new(FhirBase::R4)
                    .with_id("m1")
                    .with_version_id("1"),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(v1["status"], "in-progress");

        let history = service
            .history_by_id(&SanitizedArgs::new(FhirBase::R4).with_id("m1"))
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["meta"]["versionId"], "2");
    }

    #[tokio::test]
    async fn test_remove_keeps_history() {
        let service = InMemoryService::new("Media");
        service
            .create(write_args(FhirBase::R4, Some("m1"), media("completed")))
            .await
            .unwrap();

        let args = SanitizedArgs::new(FhirBase::R4).with_id("m1");
        service.remove(&args).await.unwrap();

        assert!(service.search_by_id(&args).await.unwrap().is_none());
        assert_eq!(service.history(&args).await.unwrap().len(), 1);
        assert!(matches!(
            service.remove(&args).await.unwrap_err(),
            ServiceError::Gone { .. }
        ));

        let unknown = SanitizedArgs::new(FhirBase::R4).with_id("nope");
        assert!(matches!(
            service.remove(&unknown).await.unwrap_err(),
            ServiceError::NotFound { .. }
        ));

        let recreated = service
            .update(write_args(FhirBase::R4, Some("m1"), media("completed")))
            .await
            .unwrap();
        assert!(recreated.created);
        assert_eq!(recreated.version_id.as_deref(), Some("3"));

        let history = service.history_by_id(&args).await.unwrap();
        let versions: Vec<_> = history.iter().map(|r| r["meta"]["versionId"].clone()).collect();
        assert_eq!(versions, vec![json!("3"), json!("1")]);
    }

    #[tokio::test]
    async fn test_create_over_deleted_id() {
        let service = InMemoryService::new("Media");
        service
            .create(write_args(FhirBase::R4, Some("m1"), media("in-progress")))
            .await
            .unwrap();
        service
            .remove(&SanitizedArgs::new(FhirBase::R4).with_id("m1"))
            .await
            .unwrap();

        let outcome = service
            .create(write_args(FhirBase::R4, Some("m1"), media("completed")))
            .await
            .unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.version_id.as_deref(), Some("3"));

        let err = service
            .create(write_args(FhirBase::R4, Some("m1"), media("completed")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_search_by_id_param() {
        let service = InMemoryService::new("Media");
        for id in ["b", "a", "c"] {
            service
                .create(write_args(FhirBase::R4, Some(id), media("completed")))
                .await
                .unwrap();
        }

        let all = service.search(&SanitizedArgs::new(FhirBase::R4)).await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let some = service
            .search(&SanitizedArgs::new(FhirBase::R4).with_param("_id", "c,a"))
            .await
            .unwrap();
        assert_eq!(some.len(), 2);
    }

    #[tokio::test]
    async fn test_create_without_id_assigns_one() {
        let service = InMemoryService::new("Media");
        let outcome = service
            .create(write_args(FhirBase::Dstu2, None, media("completed")))
            .await
            .unwrap();
        assert!(!outcome.id.is_empty());
    }
}
