//! Platform process configuration.
//!
//! # Responsibilities
//! - Define the TOML schema for the platform process (listener, admin
//!   API key, configuration store backend, observability)
//! - Provide defaults so the platform starts with no file at all
//! - Load and validate a configuration file before the server binds
//!
//! Note this is the configuration of the PLATFORM PROCESS, not of the
//! metadata servers it hosts. Server configuration documents live in the
//! configuration store and are edited through the admin API.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level platform configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlatformConfig {
    #[serde(default)]
    pub listener: ListenerConfig,
    #[serde(default)]
    pub admin: AdminApiConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Address the admin API binds to.
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9443".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminApiConfig {
    /// Bearer token expected on every admin request.
    pub api_key: String,
}

impl Default for AdminApiConfig {
    fn default() -> Self {
        Self {
            api_key: "change-me".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Default store backend when no platform-wide connection is
    /// installed. `file` or `memory`.
    pub provider: String,
    /// Directory holding one JSON document per server (file provider).
    pub root_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: "file".to_string(),
            root_dir: "data/servers".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
    pub metrics_address: String,
    /// Default tracing filter when RUST_LOG is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
            log_filter: "metaplane=info,tower_http=info".to_string(),
        }
    }
}

/// A single semantic problem found during validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Semantic checks that TOML parsing cannot express.
pub fn validate_config(config: &PlatformConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address".to_string(),
            message: format!("`{}` is not a socket address", config.listener.bind_address),
        });
    }
    if config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError {
            field: "admin.api_key".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    match config.store.provider.as_str() {
        "file" => {
            if config.store.root_dir.trim().is_empty() {
                errors.push(ValidationError {
                    field: "store.root_dir".to_string(),
                    message: "must not be empty for the file provider".to_string(),
                });
            }
        }
        "memory" => {}
        other => errors.push(ValidationError {
            field: "store.provider".to_string(),
            message: format!("`{other}` is not a known store provider"),
        }),
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address".to_string(),
            message: format!(
                "`{}` is not a socket address",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<PlatformConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: PlatformConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PlatformConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_api_key_rejected() {
        let mut config = PlatformConfig::default();
        config.admin.api_key = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "admin.api_key");
    }

    #[test]
    fn unknown_store_provider_rejected() {
        let mut config = PlatformConfig::default();
        config.store.provider = "ledger".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "store.provider");
    }

    #[test]
    fn parses_partial_toml() {
        let config: PlatformConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:8443"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8443");
        assert_eq!(config.store.provider, "file");
    }

    #[test]
    fn bad_bind_address_rejected() {
        let mut config = PlatformConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        assert!(validate_config(&config).is_err());
    }
}
