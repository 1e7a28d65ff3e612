//! Element tables for the registered resource types.
//!
//! Each table lists the top-level elements a resource declares in a given
//! FHIR release. Choice elements are listed with their type suffixes.

/// Elements inherited from Resource and DomainResource in every release.
pub const COMMON_ELEMENTS: &[&str] = &[
    "id",
    "meta",
    "implicitRules",
    "language",
    "text",
    "contained",
    "extension",
    "modifierExtension",
];

pub const MEDIA_DSTU2: &[&str] = &[
    "type",
    "subtype",
    "identifier",
    "subject",
    "operator",
    "view",
    "deviceName",
    "height",
    "width",
    "frames",
    "duration",
    "content",
];

pub const MEDIA_STU3: &[&str] = &[
    "identifier",
    "basedOn",
    "type",
    "subtype",
    "view",
    "subject",
    "context",
    "occurrenceDateTime",
    "occurrencePeriod",
    "operator",
    "reasonCode",
    "bodySite",
    "device",
    "height",
    "width",
    "frames",
    "duration",
    "content",
    "note",
];

pub const MEDIA_R4: &[&str] = &[
    "identifier",
    "basedOn",
    "partOf",
    "status",
    "type",
    "modality",
    "view",
    "subject",
    "encounter",
    "createdDateTime",
    "createdPeriod",
    "issued",
    "operator",
    "reasonCode",
    "bodySite",
    "deviceName",
    "device",
    "height",
    "width",
    "frames",
    "duration",
    "content",
    "note",
];

pub const MEDICATION_ADMINISTRATION_DSTU2: &[&str] = &[
    "identifier",
    "status",
    "patient",
    "practitioner",
    "encounter",
    "prescription",
    "wasNotGiven",
    "reasonNotGiven",
    "reasonGiven",
    "effectiveTimeDateTime",
    "effectiveTimePeriod",
    "medicationCodeableConcept",
    "medicationReference",
    "device",
    "note",
    "dosage",
];

pub const MEDICATION_ADMINISTRATION_STU3: &[&str] = &[
    "identifier",
    "definition",
    "partOf",
    "status",
    "category",
    "medicationCodeableConcept",
    "medicationReference",
    "subject",
    "context",
    "supportingInformation",
    "effectiveDateTime",
    "effectivePeriod",
    "performer",
    "notGiven",
    "reasonNotGiven",
    "reasonCode",
    "reasonReference",
    "prescription",
    "device",
    "note",
    "dosage",
    "eventHistory",
];

pub const MEDICATION_ADMINISTRATION_R4: &[&str] = &[
    "identifier",
    "instantiates",
    "partOf",
    "status",
    "statusReason",
    "category",
    "medicationCodeableConcept",
    "medicationReference",
    "subject",
    "context",
    "supportingInformation",
    "effectiveDateTime",
    "effectivePeriod",
    "performer",
    "reasonCode",
    "reasonReference",
    "request",
    "device",
    "note",
    "dosage",
    "eventHistory",
];

pub const MESSAGE_DEFINITION_STU3: &[&str] = &[
    "url",
    "identifier",
    "version",
    "name",
    "title",
    "status",
    "experimental",
    "date",
    "publisher",
    "contact",
    "description",
    "useContext",
    "jurisdiction",
    "purpose",
    "copyright",
    "base",
    "parent",
    "replaces",
    "event",
    "category",
    "focus",
    "responseRequired",
    "allowedResponse",
];

pub const MESSAGE_DEFINITION_R4: &[&str] = &[
    "url",
    "identifier",
    "version",
    "replaces",
    "name",
    "title",
    "status",
    "experimental",
    "date",
    "publisher",
    "contact",
    "description",
    "useContext",
    "jurisdiction",
    "purpose",
    "copyright",
    "base",
    "parent",
    "eventCoding",
    "eventUri",
    "category",
    "focus",
    "responseRequired",
    "allowedResponse",
    "graph",
];
