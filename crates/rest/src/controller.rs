//! Generic resource controller.
//!
//! One [`ResourceController`] is created per enabled profile. Each
//! interaction resolves the resource descriptor for the request's base, calls
//! the profile's service once and formats the result. Service failures are
//! logged once at error level before being translated.

use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::ServerConfig;
use crate::error::{RestError, RestResult};
use crate::extractors::SanitizedArgs;
use crate::profiles::ProfileDefinition;
use crate::registry::{ResourceDescriptor, ResourceInstance, ResourceResolver};
use crate::responses::formatter::{self, BundleOptions, PageRequest};
use crate::service::{ResourceService, ServiceError, WriteArgs};
use crate::version::FhirBase;

/// Controller for one profile.
#[derive(Clone)]
pub struct ResourceController {
    profile: &'static ProfileDefinition,
    service: Arc<dyn ResourceService>,
    resolver: Arc<dyn ResourceResolver>,
    config: Arc<ServerConfig>,
}

impl std::fmt::Debug for ResourceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceController")
            .field("resource_type", &self.profile.resource_type)
            .field("service", &self.service.name())
            .finish()
    }
}

impl ResourceController {
    /// Creates a controller.
    pub fn new(
        profile: &'static ProfileDefinition,
        service: Arc<dyn ResourceService>,
        resolver: Arc<dyn ResourceResolver>,
        config: Arc<ServerConfig>,
    ) -> Self {
        Self {
            profile,
            service,
            resolver,
            config,
        }
    }

    /// Returns the resource type this controller serves.
    pub fn resource_type(&self) -> &'static str {
        self.profile.resource_type
    }

    fn resolve(&self, base: FhirBase) -> RestResult<ResourceDescriptor> {
        self.resolver
            .resolve(base, self.profile.resource_type)
            .ok_or_else(|| RestError::UnsupportedResource {
                resource_type: self.profile.resource_type.to_string(),
                base,
            })
    }

    fn service_failure(&self, interaction: &str, base: FhirBase, err: ServiceError) -> RestError {
        error!(
            resource_type = self.profile.resource_type,
            service = self.service.name(),
            base = %base,
            error = %err,
            "{} failed",
            interaction
        );
        RestError::internal(err.to_string(), base)
    }

    /// Checks the body's `resourceType` against the descriptor and builds
    /// the resource.
    fn construct(
        &self,
        descriptor: &ResourceDescriptor,
        args: &SanitizedArgs,
    ) -> RestResult<ResourceInstance> {
        let empty = Value::Object(Default::default());
        let body = args.resource_body.as_ref().unwrap_or(&empty);
        let received = body
            .get("resourceType")
            .and_then(Value::as_str)
            .unwrap_or_default();

        if received != descriptor.resource_type() {
            return Err(RestError::invalid_parameter(
                format!(
                    "'resourceType' expected to have value of '{}', received '{}'",
                    descriptor.resource_type(),
                    received
                ),
                args.base,
            ));
        }

        Ok(descriptor.construct(body))
    }

    fn page_request(&self, args: &SanitizedArgs) -> PageRequest {
        PageRequest {
            link_base: format!(
                "{}/{}/{}",
                self.config.full_base_url(),
                args.base,
                self.profile.resource_type
            ),
            params: args
                .params
                .iter()
                .filter(|(name, _)| name != "_count" && name != "_offset")
                .cloned()
                .collect(),
            count: self.config.page_size(args.count()),
            offset: args.offset().unwrap_or(0),
        }
    }

    /// Searches resources of the profile's type.
    pub async fn search(&self, args: SanitizedArgs) -> RestResult<Response> {
        debug!(resource_type = self.profile.resource_type, base = %args.base, "search");
        self.resolve(args.base)?;

        let results = self
            .service
            .search(&args)
            .await
            .map_err(|e| self.service_failure("search", args.base, e))?;

        let options = BundleOptions::search(self.profile.resource_type)
            .with_resource_url(self.config.resource_url())
            .with_page(self.page_request(&args));
        Ok(formatter::bundle_read_response(args.base, results, options))
    }

    /// Reads the current version of a resource.
    pub async fn search_by_id(&self, args: SanitizedArgs) -> RestResult<Response> {
        debug!(resource_type = self.profile.resource_type, base = %args.base, id = ?args.id, "searchById");
        self.resolve(args.base)?;

        let resource = self
            .service
            .search_by_id(&args)
            .await
            .map_err(|e| self.service_failure("searchById", args.base, e))?;

        formatter::single_read_response(
            args.base,
            self.profile.resource_type,
            args.id.as_deref().unwrap_or_default(),
            resource,
        )
    }

    /// Reads a specific version of a resource.
    pub async fn search_by_version_id(&self, args: SanitizedArgs) -> RestResult<Response> {
        debug!(
            resource_type = self.profile.resource_type,
            base = %args.base,
            id = ?args.id,
            version_id = ?args.version_id,
            "searchByVersionId"
        );
        self.resolve(args.base)?;

        let resource = self
            .service
            .search_by_version_id(&args)
            .await
            .map_err(|e| self.service_failure("searchByVersionId", args.base, e))?;

        formatter::single_vread_response(
            args.base,
            self.profile.resource_type,
            args.id.as_deref().unwrap_or_default(),
            args.version_id.as_deref().unwrap_or_default(),
            resource,
        )
    }

    /// Creates a resource from the request body.
    pub async fn create(&self, args: SanitizedArgs) -> RestResult<Response> {
        debug!(resource_type = self.profile.resource_type, base = %args.base, "create");
        let descriptor = self.resolve(args.base)?;
        let resource = self.construct(&descriptor, &args)?;

        let outcome = self
            .service
            .create(WriteArgs {
                base: args.base,
                id: args.resource_id.clone(),
                resource,
            })
            .await
            .map_err(|e| self.service_failure("create", args.base, e))?;

        Ok(formatter::create_response(
            args.base,
            descriptor.resource_type(),
            self.config.full_base_url(),
            &outcome,
        ))
    }

    /// Updates, or creates, the resource at the path id.
    pub async fn update(&self, args: SanitizedArgs) -> RestResult<Response> {
        debug!(resource_type = self.profile.resource_type, base = %args.base, id = ?args.id, "update");
        let descriptor = self.resolve(args.base)?;
        let resource = self.construct(&descriptor, &args)?;

        let outcome = self
            .service
            .update(WriteArgs {
                base: args.base,
                id: args.id.clone(),
                resource,
            })
            .await
            .map_err(|e| self.service_failure("update", args.base, e))?;

        Ok(formatter::update_response(
            args.base,
            descriptor.resource_type(),
            self.config.full_base_url(),
            &outcome,
        ))
    }

    /// Deletes a resource.
    ///
    /// Does not consult the resolver. Rejections go through the delete
    /// mapping rather than becoming internal errors.
    pub async fn remove(&self, args: SanitizedArgs) -> RestResult<Response> {
        debug!(resource_type = self.profile.resource_type, base = %args.base, id = ?args.id, "remove");

        match self.service.remove(&args).await {
            Ok(()) => Ok(formatter::delete_response()),
            Err(err) => {
                error!(
                    resource_type = self.profile.resource_type,
                    service = self.service.name(),
                    base = %args.base,
                    error = %err,
                    "remove failed"
                );
                Err(formatter::delete_rejection(err, args.base))
            }
        }
    }

    /// Returns the history of all resources of the type.
    pub async fn history(&self, args: SanitizedArgs) -> RestResult<Response> {
        debug!(resource_type = self.profile.resource_type, base = %args.base, "history");
        self.resolve(args.base)?;

        let results = self
            .service
            .history(&args)
            .await
            .map_err(|e| self.service_failure("history", args.base, e))?;

        Ok(formatter::bundle_read_response(
            args.base,
            results,
            BundleOptions::history(self.profile.resource_type),
        ))
    }

    /// Returns the history of one resource.
    pub async fn history_by_id(&self, args: SanitizedArgs) -> RestResult<Response> {
        debug!(resource_type = self.profile.resource_type, base = %args.base, id = ?args.id, "historyById");
        self.resolve(args.base)?;

        let results = self
            .service
            .history_by_id(&args)
            .await
            .map_err(|e| self.service_failure("historyById", args.base, e))?;

        Ok(formatter::bundle_read_response(
            args.base,
            results,
            BundleOptions::history(self.profile.resource_type),
        ))
    }
}
