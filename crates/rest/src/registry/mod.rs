//! Resource descriptor registry.
//!
//! The registry maps `(FhirBase, resource type)` to a statically registered
//! [`ResourceDescriptor`]. It is populated once at startup and then shared
//! read-only between all controllers.
//!
//! A descriptor plays the role of a resource "constructor": it carries the
//! `resourceType` tag and builds a [`ResourceInstance`] from a raw JSON body,
//! keeping only the elements the resource declares in that FHIR release.

mod elements;

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::version::FhirBase;

/// Resolves resource descriptors by base version and resource type name.
pub trait ResourceResolver: Send + Sync {
    /// Returns the descriptor for `resource_type` in `base`, if registered.
    fn resolve(&self, base: FhirBase, resource_type: &str) -> Option<ResourceDescriptor>;
}

/// Type descriptor for one resource type in one FHIR release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    resource_type: &'static str,
    base: FhirBase,
    elements: &'static [&'static str],
}

impl ResourceDescriptor {
    /// Creates a descriptor from its element table.
    pub const fn new(
        resource_type: &'static str,
        base: FhirBase,
        elements: &'static [&'static str],
    ) -> Self {
        Self {
            resource_type,
            base,
            elements,
        }
    }

    /// Returns the declared `resourceType`.
    pub fn resource_type(&self) -> &'static str {
        self.resource_type
    }

    /// Returns the FHIR base this descriptor belongs to.
    pub fn base(&self) -> FhirBase {
        self.base
    }

    /// Returns true if `name` is an element of this resource.
    ///
    /// Primitive extension siblings (`_status` for `status`) count as the
    /// element they extend.
    pub fn has_element(&self, name: &str) -> bool {
        let name = name.strip_prefix('_').unwrap_or(name);
        elements::COMMON_ELEMENTS.contains(&name) || self.elements.contains(&name)
    }

    /// Builds a resource instance from a raw body.
    ///
    /// Unknown elements are dropped and `resourceType` is always set to the
    /// descriptor's type. A non-object body yields an instance with no
    /// elements.
    pub fn construct(&self, body: &Value) -> ResourceInstance {
        let mut content = Map::new();
        content.insert(
            "resourceType".to_string(),
            Value::String(self.resource_type.to_string()),
        );

        if let Some(object) = body.as_object() {
            for (key, value) in object {
                if self.has_element(key) {
                    content.insert(key.clone(), value.clone());
                }
            }
        }

        ResourceInstance {
            resource_type: self.resource_type,
            content,
        }
    }
}

/// A resource built by a [`ResourceDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceInstance {
    resource_type: &'static str,
    content: Map<String, Value>,
}

impl ResourceInstance {
    /// Returns the resource type.
    pub fn resource_type(&self) -> &'static str {
        self.resource_type
    }

    /// Returns the logical id, if the body carried one.
    pub fn id(&self) -> Option<&str> {
        self.content.get("id").and_then(|v| v.as_str())
    }

    /// Sets the logical id.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.content.insert("id".to_string(), Value::String(id.into()));
    }

    /// Returns an element by name.
    pub fn get(&self, element: &str) -> Option<&Value> {
        self.content.get(element)
    }

    /// Returns the elements as a JSON object map.
    pub fn content(&self) -> &Map<String, Value> {
        &self.content
    }

    /// Consumes the instance and returns the JSON representation.
    pub fn into_value(self) -> Value {
        Value::Object(self.content)
    }
}

/// Static registry of resource descriptors.
#[derive(Debug, Default, Clone)]
pub struct ResourceRegistry {
    descriptors: HashMap<FhirBase, HashMap<&'static str, ResourceDescriptor>>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every resource type this server knows.
    ///
    /// MessageDefinition first appeared in STU3 and has no DSTU2 descriptor.
    pub fn standard() -> Self {
        use elements::*;

        let mut registry = Self::new();
        registry.register(ResourceDescriptor::new("Media", FhirBase::Dstu2, MEDIA_DSTU2));
        registry.register(ResourceDescriptor::new("Media", FhirBase::Stu3, MEDIA_STU3));
        registry.register(ResourceDescriptor::new("Media", FhirBase::R4, MEDIA_R4));
        registry.register(ResourceDescriptor::new(
            "MedicationAdministration",
            FhirBase::Dstu2,
            MEDICATION_ADMINISTRATION_DSTU2,
        ));
        registry.register(ResourceDescriptor::new(
            "MedicationAdministration",
            FhirBase::Stu3,
            MEDICATION_ADMINISTRATION_STU3,
        ));
        registry.register(ResourceDescriptor::new(
            "MedicationAdministration",
            FhirBase::R4,
            MEDICATION_ADMINISTRATION_R4,
        ));
        registry.register(ResourceDescriptor::new(
            "MessageDefinition",
            FhirBase::Stu3,
            MESSAGE_DEFINITION_STU3,
        ));
        registry.register(ResourceDescriptor::new(
            "MessageDefinition",
            FhirBase::R4,
            MESSAGE_DEFINITION_R4,
        ));
        registry
    }

    /// Registers a descriptor, replacing any previous one for the same key.
    pub fn register(&mut self, descriptor: ResourceDescriptor) {
        self.descriptors
            .entry(descriptor.base)
            .or_default()
            .insert(descriptor.resource_type, descriptor);
    }

    /// Returns the resource types registered for `base`, sorted.
    pub fn resource_types(&self, base: FhirBase) -> Vec<&'static str> {
        let mut types: Vec<_> = self
            .descriptors
            .get(&base)
            .map(|by_type| by_type.keys().copied().collect())
            .unwrap_or_default();
        types.sort_unstable();
        types
    }

    /// Returns the number of registered descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.values().map(HashMap::len).sum()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceResolver for ResourceRegistry {
    fn resolve(&self, base: FhirBase, resource_type: &str) -> Option<ResourceDescriptor> {
        self.descriptors
            .get(&base)
            .and_then(|by_type| by_type.get(resource_type))
            .copied()
    }
}
