//! Application state shared by the system-level handlers.
//!
//! Profile routes carry their own [`ResourceController`](crate::controller::ResourceController);
//! this state backs `/health` and `/{base}/metadata`, which describe every
//! mounted profile.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::profiles::ProfileConfig;
use crate::registry::ResourceRegistry;
use crate::version::FhirBase;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    registry: Arc<ResourceRegistry>,
    config: Arc<ServerConfig>,
    profiles: Arc<Vec<ProfileConfig>>,
}

impl AppState {
    /// Creates the state from the registry, configuration and enabled
    /// profiles.
    pub fn new(
        registry: Arc<ResourceRegistry>,
        config: Arc<ServerConfig>,
        profiles: Vec<ProfileConfig>,
    ) -> Self {
        Self {
            registry,
            config,
            profiles: Arc::new(profiles),
        }
    }

    /// Returns the resource registry.
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &Arc<ServerConfig> {
        &self.config
    }

    /// Returns the enabled profiles.
    pub fn profiles(&self) -> &[ProfileConfig] {
        &self.profiles
    }

    /// Returns the profiles mounted under `base`.
    pub fn mounted_profiles(&self, base: FhirBase) -> Vec<&ProfileConfig> {
        self.profiles
            .iter()
            .filter(|p| p.mounted_versions(&*self.registry).contains(&base))
            .collect()
    }

    /// Returns every base at least one profile is mounted under.
    pub fn mounted_bases(&self) -> Vec<FhirBase> {
        let mut bases: Vec<_> = self
            .profiles
            .iter()
            .flat_map(|p| p.mounted_versions(&*self.registry))
            .collect();
        bases.sort();
        bases.dedup();
        bases
    }
}
