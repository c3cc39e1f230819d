//! Configuration loading from a TOML file and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "COMMENTS_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML file without validating it.
pub fn load_file(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the effective configuration: file (if any), then process environment, then validation.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let base = match path {
        Some(p) => load_file(p)?,
        None => ServerConfig::default(),
    };

    let config = apply_env_overrides(base, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay `PORT`, `ORIGIN`, `ADMIN_TOKEN`, `MODERATION_ENABLED`, `DATABASE_URL`
/// and `METRICS_ADDRESS` onto `config`.
///
/// `MODERATION_ENABLED` enables moderation for any non-empty value, "0" included.
pub fn apply_env_overrides<F>(mut config: ServerConfig, lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.is_empty());

    if let Some(port) = get("PORT") {
        config.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { var: "PORT", value: port.clone() })?;
    }
    if let Some(origin) = get("ORIGIN") {
        config.origin = origin;
    }
    if let Some(token) = get("ADMIN_TOKEN") {
        config.admin_token = token;
    }
    if get("MODERATION_ENABLED").is_some() {
        config.moderation_enabled = true;
    }
    if let Some(url) = get("DATABASE_URL") {
        config.database_url = url;
    }
    if let Some(addr) = get("METRICS_ADDRESS") {
        config.metrics_address = Some(addr);
    }

    Ok(config)
}
