//! Server configuration for the profile controllers.
//!
//! Supports programmatic configuration, command line arguments and
//! environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `REST_SERVER_PORT` | 8080 | Server port |
//! | `REST_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `REST_LOG_LEVEL` | info | Log level |
//! | `REST_MAX_BODY_SIZE` | 10485760 | Max request body (bytes) |
//! | `REST_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `REST_ENABLE_CORS` | true | Enable CORS |
//! | `REST_CORS_ORIGINS` | * | Allowed origins |
//! | `REST_CORS_METHODS` | GET,POST,PUT,DELETE,OPTIONS | Allowed methods |
//! | `REST_CORS_HEADERS` | Content-Type,Authorization,Accept | Allowed headers |
//! | `REST_BASE_URL` | http://localhost:8080 | Server base URL |
//! | `REST_AUTH_RESOURCE_SERVER` | (unset) | Resource server URL for search bundle `fullUrl`s |
//! | `REST_PROFILES` | media,medicationadministration,messagedefinition | Enabled profiles |
//! | `REST_FHIR_VERSIONS` | 1_0_2,3_0_1,4_0_0 | Enabled FHIR bases |
//!
//! # Example
//!
//! ```rust
//! use helios_profiles::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     profiles: "media".to_string(),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use clap::Parser;

use crate::profiles::{ProfileDefinition, find_profile};
use crate::version::FhirBase;

/// Server configuration for the profile controllers.
#[derive(Debug, Clone, Parser)]
#[command(name = "hfs")]
#[command(about = "FHIR profile server for Media, MedicationAdministration and MessageDefinition")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "REST_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "REST_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "REST_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "REST_MAX_BODY_SIZE", default_value = "10485760")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "REST_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "REST_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "REST_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(
        long,
        env = "REST_CORS_METHODS",
        default_value = "GET,POST,PUT,DELETE,OPTIONS"
    )]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "REST_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept"
    )]
    pub cors_headers: String,

    /// Base URL for the server (used in Location headers and Bundle links).
    #[arg(long, env = "REST_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Resource server URL; search bundle entries get a `fullUrl` under it.
    #[arg(long, env = "REST_AUTH_RESOURCE_SERVER")]
    pub resource_server: Option<String>,

    /// Enabled profiles (comma-separated keys or resource type names).
    #[arg(
        long,
        env = "REST_PROFILES",
        default_value = "media,medicationadministration,messagedefinition"
    )]
    pub profiles: String,

    /// Enabled FHIR bases (comma-separated segments, versions or release names).
    #[arg(long, env = "REST_FHIR_VERSIONS", default_value = "1_0_2,3_0_1,4_0_0")]
    pub fhir_versions: String,

    /// Default page size for search results.
    #[arg(long, env = "REST_DEFAULT_PAGE_SIZE", default_value = "20")]
    pub default_page_size: usize,

    /// Maximum page size for search results.
    #[arg(long, env = "REST_MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 10 * 1024 * 1024, // 10MB
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PUT,DELETE,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept".to_string(),
            base_url: "http://localhost:8080".to_string(),
            resource_server: None,
            profiles: "media,medicationadministration,messagedefinition".to_string(),
            fhir_versions: "1_0_2,3_0_1,4_0_0".to_string(),
            default_page_size: 20,
            max_page_size: 1000,
        }
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

impl ServerConfig {
    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the base URL without a trailing slash.
    pub fn full_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Returns the resource server URL without a trailing slash.
    pub fn resource_url(&self) -> Option<&str> {
        self.resource_server
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }

    /// Parses the enabled profiles.
    pub fn enabled_profiles(&self) -> Result<Vec<&'static ProfileDefinition>, String> {
        let mut profiles = Vec::new();
        for name in split_list(&self.profiles) {
            let profile = find_profile(name).ok_or_else(|| format!("Unknown profile: {}", name))?;
            if !profiles.contains(&profile) {
                profiles.push(profile);
            }
        }
        Ok(profiles)
    }

    /// Parses the enabled FHIR bases.
    pub fn enabled_versions(&self) -> Result<Vec<FhirBase>, String> {
        let mut versions = split_list(&self.fhir_versions)
            .map(|v| v.parse::<FhirBase>().map_err(|e| e.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        versions.sort();
        versions.dedup();
        Ok(versions)
    }

    /// Returns the page size for a requested `_count`.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|count| *count > 0)
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        match self.enabled_profiles() {
            Ok(profiles) if profiles.is_empty() => {
                errors.push("At least one profile must be enabled".to_string())
            }
            Ok(_) => {}
            Err(e) => errors.push(e),
        }

        match self.enabled_versions() {
            Ok(versions) if versions.is_empty() => {
                errors.push("At least one FHIR version must be enabled".to_string())
            }
            Ok(_) => {}
            Err(e) => errors.push(e),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// Uses ephemeral port 0 and a fixed resource server URL.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            base_url: "http://localhost:8080".to_string(),
            resource_server: Some("http://fhir.test".to_string()),
            default_page_size: 10,
            max_page_size: 100,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{MEDIA, MESSAGE_DEFINITION};

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.enable_cors);
        assert_eq!(config.resource_url(), None);
        assert_eq!(config.enabled_profiles().unwrap().len(), 3);
        assert_eq!(config.enabled_versions().unwrap(), FhirBase::ALL.to_vec());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            port: 3000,
            host: "0.0.0.0".to_string(),
            ..Default::default()
        };
        assert_eq!(config.socket_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let config = ServerConfig {
            base_url: "http://example.org/fhir/".to_string(),
            resource_server: Some("http://rs.example.org/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.full_base_url(), "http://example.org/fhir");
        assert_eq!(config.resource_url(), Some("http://rs.example.org"));

        let empty = ServerConfig {
            resource_server: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(empty.resource_url(), None);
    }

    #[test]
    fn test_enabled_profiles_dedup() {
        let config = ServerConfig {
            profiles: "media, Media ,MessageDefinition".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.enabled_profiles().unwrap(),
            vec![&MEDIA, &MESSAGE_DEFINITION]
        );
    }

    #[test]
    fn test_enabled_versions_accepts_aliases() {
        let config = ServerConfig {
            fhir_versions: "r4,1.0.2,4_0_0".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.enabled_versions().unwrap(),
            vec![FhirBase::Dstu2, FhirBase::R4]
        );
    }

    #[test]
    fn test_page_size() {
        let config = ServerConfig::for_testing();
        assert_eq!(config.page_size(None), 10);
        assert_eq!(config.page_size(Some(0)), 10);
        assert_eq!(config.page_size(Some(5)), 5);
        assert_eq!(config.page_size(Some(5000)), 100);
    }

    #[test]
    fn test_validate_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_port() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().iter().any(|e| e.contains("Port")));
    }

    #[test]
    fn test_validate_invalid_page_sizes() {
        let config = ServerConfig {
            default_page_size: 100,
            max_page_size: 50,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_profile_and_version() {
        let config = ServerConfig {
            profiles: "media,patient".to_string(),
            fhir_versions: "5_0_0".to_string(),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("patient")));
        assert!(errors.iter().any(|e| e.contains("5_0_0")));
    }

    #[test]
    fn test_validate_empty_profiles() {
        let config = ServerConfig {
            profiles: " , ".to_string(),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("profile")));
    }

    #[test]
    fn test_parse_command_line() {
        let config = ServerConfig::try_parse_from([
            "hfs",
            "--port",
            "9090",
            "--max-body-size",
            "2048",
            "--profiles",
            "media",
            "--resource-server",
            "http://rs.example",
        ])
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.max_body_size, 2048);
        assert_eq!(config.enabled_profiles().unwrap().len(), 1);
        assert_eq!(config.resource_url(), Some("http://rs.example"));
    }

    #[test]
    fn test_for_testing() {
        let config = ServerConfig::for_testing();
        assert_eq!(config.port, 0);
        assert!(!config.enable_cors);
        assert_eq!(config.resource_url(), Some("http://fhir.test"));
    }
}
