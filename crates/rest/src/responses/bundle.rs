//! Bundle construction for search and history responses.

use serde_json::{Value, json};

/// Bundle types produced by the controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleType {
    /// Search results.
    Searchset,
    /// History results.
    History,
}

impl BundleType {
    /// Returns the FHIR code.
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleType::Searchset => "searchset",
            BundleType::History => "history",
        }
    }
}

/// A link in a Bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLink {
    /// The relation (self, next, previous).
    pub relation: &'static str,
    /// The URL.
    pub url: String,
}

impl BundleLink {
    /// Converts to FHIR JSON.
    pub fn to_json(&self) -> Value {
        json!({ "relation": self.relation, "url": self.url })
    }
}

/// An entry in a Bundle.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    /// Full URL of the resource.
    pub full_url: Option<String>,
    /// The resource.
    pub resource: Value,
    /// True for primary search matches.
    pub search_match: bool,
}

impl BundleEntry {
    /// Converts to FHIR JSON.
    pub fn to_json(&self) -> Value {
        let mut entry = json!({});
        if let Some(url) = &self.full_url {
            entry["fullUrl"] = json!(url);
        }
        entry["resource"] = self.resource.clone();
        if self.search_match {
            entry["search"] = json!({ "mode": "match" });
        }
        entry
    }
}

/// Builder for Bundle resources.
#[derive(Debug)]
pub struct BundleBuilder {
    bundle_type: BundleType,
    total: Option<usize>,
    links: Vec<BundleLink>,
    entries: Vec<BundleEntry>,
}

impl BundleBuilder {
    /// Creates a builder for `bundle_type`.
    pub fn new(bundle_type: BundleType) -> Self {
        Self {
            bundle_type,
            total: None,
            links: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Creates a searchset bundle builder.
    pub fn searchset() -> Self {
        Self::new(BundleType::Searchset)
    }

    /// Creates a history bundle builder.
    pub fn history() -> Self {
        Self::new(BundleType::History)
    }

    /// Sets the total count.
    pub fn total(mut self, count: usize) -> Self {
        self.total = Some(count);
        self
    }

    /// Adds a link.
    pub fn link(mut self, relation: &'static str, url: impl Into<String>) -> Self {
        self.links.push(BundleLink {
            relation,
            url: url.into(),
        });
        self
    }

    /// Adds an entry.
    pub fn add_entry(mut self, entry: BundleEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Builds the Bundle resource.
    pub fn build(self) -> Value {
        let mut bundle = json!({
            "resourceType": "Bundle",
            "type": self.bundle_type.as_str(),
            "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        });

        if let Some(total) = self.total {
            bundle["total"] = json!(total);
        }

        if !self.links.is_empty() {
            bundle["link"] = Value::Array(self.links.iter().map(BundleLink::to_json).collect());
        }

        bundle["entry"] = Value::Array(self.entries.iter().map(BundleEntry::to_json).collect());

        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_searchset_bundle() {
        let media = json!({"resourceType": "Media", "id": "m1"});

        let bundle = BundleBuilder::searchset()
            .total(1)
            .link("self", "http://example.com/4_0_0/Media")
            .add_entry(BundleEntry {
                full_url: Some("http://example.com/Media/m1".to_string()),
                resource: media,
                search_match: true,
            })
            .build();

        assert_eq!(bundle["resourceType"], "Bundle");
        assert_eq!(bundle["type"], "searchset");
        assert_eq!(bundle["total"], 1);
        assert_eq!(bundle["link"][0]["relation"], "self");
        assert_eq!(bundle["entry"][0]["fullUrl"], "http://example.com/Media/m1");
        assert_eq!(bundle["entry"][0]["search"]["mode"], "match");
        assert!(bundle["timestamp"].is_string());
    }

    #[test]
    fn test_history_bundle_without_full_url() {
        let bundle = BundleBuilder::history()
            .add_entry(BundleEntry {
                full_url: None,
                resource: json!({"resourceType": "Media", "id": "m1"}),
                search_match: false,
            })
            .build();

        assert_eq!(bundle["type"], "history");
        assert!(bundle.get("link").is_none());
        assert!(bundle["entry"][0].get("fullUrl").is_none());
        assert!(bundle["entry"][0].get("search").is_none());
    }

    #[test]
    fn test_empty_bundle_has_entry_array() {
        let bundle = BundleBuilder::searchset().total(0).build();
        assert_eq!(bundle["entry"], json!([]));
    }
}
