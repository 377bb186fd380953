//! Client configuration management.
//!
//! Handles loading, saving, and validating the settings a `RestClient` is
//! built from: base URI, retry policy, authentication, and the ordered JSON
//! processor chains. Configuration is persisted as TOML on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{RcError, RcResult};
use crate::platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Connection settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Retry and backoff settings.
    #[serde(default)]
    pub retry: RetrySettings,

    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Outbound and inbound JSON processors.
    #[serde(default)]
    pub processors: ProcessorConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URI that request paths are appended to (e.g. "https://api.example.com/v1").
    #[serde(default)]
    pub base_uri: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Whether to accept invalid TLS certificates.
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// Retry configuration as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries allowed after the initial attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Linear backoff step in milliseconds.
    #[serde(default = "default_backoff_step")]
    pub backoff_step_ms: u64,
}

/// Which auth provider to attach to the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    /// No Authorization header.
    #[default]
    None,
    /// A fixed bearer token.
    Bearer,
    /// Keycloak token endpoint (password or client-credentials grant).
    Keycloak,
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Provider kind.
    #[serde(default)]
    pub kind: AuthKind,

    /// Static bearer token (kind = "bearer").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Token endpoint URI (kind = "keycloak").
    #[serde(default)]
    pub endpoint: String,

    /// OAuth client id.
    #[serde(default)]
    pub client_id: String,

    /// Client secret, or the user's password when `username` is set.
    #[serde(default)]
    pub secret: String,

    /// Selects the password grant when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Named JSON processors that can be listed in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorKind {
    SnakeToCamel,
    CamelToSnake,
    SnakeToPascal,
    PascalToSnake,
    SnakeToKebab,
    KebabToSnake,
    /// Parse ISO-8601 strings under keys containing "date".
    Dates,
}

/// Processor chains, applied in list order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Applied to request bodies before serialization.
    #[serde(default)]
    pub outbound: Vec<ProcessorKind>,

    /// Applied to response bodies after parsing.
    #[serde(default)]
    pub inbound: Vec<ProcessorKind>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

// Default value functions for serde

fn default_timeout() -> u64 {
    constants::DEFAULT_TIMEOUT_MS
}

fn default_max_retries() -> u32 {
    constants::DEFAULT_MAX_RETRIES
}

fn default_backoff_step() -> u64 {
    constants::DEFAULT_BACKOFF_STEP_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_uri: String::new(),
            timeout_ms: default_timeout(),
            accept_invalid_certs: false,
            headers: HashMap::new(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_step_ms: default_backoff_step(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file path, falling back to defaults.
    pub fn load_default() -> RcResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> RcResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&contents)?;
        config.client.base_uri = Self::sanitize_base_uri(&config.client.base_uri);
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> RcResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> RcResult<PathBuf> {
        Ok(platform::config_dir()?.join("config.toml"))
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> RcResult<PathBuf> {
        if self.logging.directory.is_empty() {
            Ok(platform::data_dir()?.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Check that the selected auth provider has the settings it needs.
    pub fn validate(&self) -> RcResult<()> {
        match self.auth.kind {
            AuthKind::None => Ok(()),
            AuthKind::Bearer => match self.auth.token.as_deref() {
                Some(token) if !token.is_empty() => Ok(()),
                _ => Err(RcError::MissingConfig("auth.token".into())),
            },
            AuthKind::Keycloak => {
                if self.auth.endpoint.is_empty() {
                    return Err(RcError::MissingConfig("auth.endpoint".into()));
                }
                if self.auth.client_id.is_empty() {
                    return Err(RcError::MissingConfig("auth.client_id".into()));
                }
                Ok(())
            }
        }
    }

    /// Sanitize a base URI.
    ///
    /// Strips surrounding whitespace and quotes and any trailing slashes, so
    /// that request paths starting with `/` concatenate cleanly.
    pub fn sanitize_base_uri(uri: &str) -> String {
        uri.trim()
            .trim_matches('"')
            .trim()
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.client.base_uri.is_empty());
        assert_eq!(config.client.timeout_ms, 30_000);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.backoff_step_ms, 1_200);
        assert_eq!(config.auth.kind, AuthKind::None);
        assert!(config.processors.inbound.is_empty());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sanitize_base_uri() {
        assert_eq!(
            AppConfig::sanitize_base_uri("  \"https://api.example.com/v1/\"  "),
            "https://api.example.com/v1"
        );
        assert_eq!(AppConfig::sanitize_base_uri("http://localhost:8080"), "http://localhost:8080");
        assert_eq!(AppConfig::sanitize_base_uri(""), "");
    }

    #[test]
    fn test_parse_processor_lists_in_order() {
        let config: AppConfig = toml::from_str(
            r#"
            [processors]
            outbound = ["camel_to_snake"]
            inbound = ["snake_to_camel", "dates"]
            "#,
        )
        .unwrap();
        assert_eq!(config.processors.outbound, vec![ProcessorKind::CamelToSnake]);
        assert_eq!(
            config.processors.inbound,
            vec![ProcessorKind::SnakeToCamel, ProcessorKind::Dates]
        );
    }

    #[test]
    fn test_unknown_processor_is_rejected() {
        let parsed: Result<AppConfig, _> = toml::from_str(
            r#"
            [processors]
            inbound = ["reverse_keys"]
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_validate_keycloak_requires_endpoint() {
        let mut config = AppConfig::default();
        config.auth.kind = AuthKind::Keycloak;
        config.auth.client_id = "app".into();
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "missing configuration: auth.endpoint");

        config.auth.endpoint = "https://sso.example.com/token".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bearer_requires_token() {
        let mut config = AppConfig::default();
        config.auth.kind = AuthKind::Bearer;
        assert!(config.validate().is_err());
        config.auth.token = Some("abc".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.client.base_uri = "https://api.example.com".into();
        config.client.headers.insert("X-Tenant".into(), "acme".into());
        config.retry.backoff_step_ms = 50;
        config.processors.inbound = vec![ProcessorKind::Dates];
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.client.base_uri, "https://api.example.com");
        assert_eq!(loaded.client.headers.get("X-Tenant").map(String::as_str), Some("acme"));
        assert_eq!(loaded.retry.backoff_step_ms, 50);
        assert_eq!(loaded.processors.inbound, vec![ProcessorKind::Dates]);
    }

    #[test]
    fn test_load_sanitizes_base_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[client]\nbase_uri = \"https://api.example.com/\"\n").unwrap();
        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.client.base_uri, "https://api.example.com");
    }

    #[test]
    fn test_effective_log_dir_override() {
        let mut config = AppConfig::default();
        config.logging.directory = "/tmp/restc-logs".into();
        assert_eq!(config.effective_log_dir().unwrap(), PathBuf::from("/tmp/restc-logs"));
    }
}
