//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
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
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: GatewayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides on top of a loaded (or default) configuration.
///
/// `API_BASE` overrides the upstream base URL and `PORT` the listening port,
/// matching the deployment conventions the gateway is dropped into. The
/// result is re-validated because overrides can be as wrong as files.
pub fn apply_env_overrides(mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    if let Ok(base) = std::env::var("API_BASE") {
        if !base.is_empty() {
            config.upstream.base_url = base;
        }
    }
    if let Ok(port) = std::env::var("PORT") {
        if let Ok(port) = port.parse::<u16>() {
            config.listener.bind_address = format!("0.0.0.0:{}", port);
        } else {
            tracing::warn!(port = %port, "Ignoring unparseable PORT override");
        }
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
