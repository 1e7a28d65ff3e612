//! Profile table.
//!
//! A profile is one resource type served by a [`ResourceController`](crate::controller::ResourceController).
//! The controllers differ only in the metadata held here; everything else is
//! shared.

use std::fmt;
use std::sync::Arc;

use crate::registry::ResourceResolver;
use crate::service::ResourceService;
use crate::version::FhirBase;

/// Static metadata for a served resource type.
#[derive(Debug, PartialEq, Eq)]
pub struct ProfileDefinition {
    /// Lowercase key used in configuration (e.g. `media`).
    pub key: &'static str,
    /// The FHIR resource type name (e.g. `Media`).
    pub resource_type: &'static str,
}

/// The Media profile.
pub const MEDIA: ProfileDefinition = ProfileDefinition {
    key: "media",
    resource_type: "Media",
};

/// The MedicationAdministration profile.
pub const MEDICATION_ADMINISTRATION: ProfileDefinition = ProfileDefinition {
    key: "medicationadministration",
    resource_type: "MedicationAdministration",
};

/// The MessageDefinition profile.
pub const MESSAGE_DEFINITION: ProfileDefinition = ProfileDefinition {
    key: "messagedefinition",
    resource_type: "MessageDefinition",
};

/// All known profiles.
pub static PROFILES: [&ProfileDefinition; 3] =
    [&MEDIA, &MEDICATION_ADMINISTRATION, &MESSAGE_DEFINITION];

/// Looks up a profile by key or resource type name, case-insensitively.
pub fn find_profile(name: &str) -> Option<&'static ProfileDefinition> {
    let name = name.trim();
    PROFILES
        .iter()
        .copied()
        .find(|p| p.key.eq_ignore_ascii_case(name) || p.resource_type.eq_ignore_ascii_case(name))
}

/// A profile enabled on this server: its definition, the service backing it
/// and the base versions it is mounted under.
#[derive(Clone)]
pub struct ProfileConfig {
    definition: &'static ProfileDefinition,
    service: Arc<dyn ResourceService>,
    versions: Vec<FhirBase>,
}

impl fmt::Debug for ProfileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileConfig")
            .field("resource_type", &self.definition.resource_type)
            .field("service", &self.service.name())
            .field("versions", &self.versions)
            .finish()
    }
}

impl ProfileConfig {
    /// Creates a profile configuration.
    pub fn new(
        definition: &'static ProfileDefinition,
        service: Arc<dyn ResourceService>,
        versions: impl IntoIterator<Item = FhirBase>,
    ) -> Self {
        let mut versions: Vec<_> = versions.into_iter().collect();
        versions.sort();
        versions.dedup();
        Self {
            definition,
            service,
            versions,
        }
    }

    /// Returns the profile definition.
    pub fn definition(&self) -> &'static ProfileDefinition {
        self.definition
    }

    /// Returns the resource type name.
    pub fn resource_type(&self) -> &'static str {
        self.definition.resource_type
    }

    /// Returns the backing service.
    pub fn service(&self) -> &Arc<dyn ResourceService> {
        &self.service
    }

    /// Returns the configured base versions.
    pub fn versions(&self) -> &[FhirBase] {
        &self.versions
    }

    /// Returns the configured versions the resolver has a descriptor for.
    ///
    /// Routes are only mounted for these; a profile configured for a release
    /// where its resource does not exist is skipped for that release.
    pub fn mounted_versions(&self, resolver: &dyn ResourceResolver) -> Vec<FhirBase> {
        self.versions
            .iter()
            .copied()
            .filter(|base| resolver.resolve(*base, self.resource_type()).is_some())
            .collect()
    }
}
