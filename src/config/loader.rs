//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
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

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ProxyConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Resolve configuration for process startup: read the file named by
/// CONFIG_PATH when set (defaults otherwise), then apply the BIND_ADDR
/// override.
pub fn from_env() -> Result<ProxyConfig, ConfigError> {
    let mut config = match std::env::var("CONFIG_PATH") {
        Ok(path) if !path.trim().is_empty() => load_config(Path::new(path.trim()))?,
        _ => ProxyConfig::default(),
    };

    if let Ok(addr) = std::env::var("BIND_ADDR") {
        let addr = addr.trim();
        if !addr.is_empty() {
            config.listener.bind_address = addr.to_string();
        }
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
