//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GuardConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `guard.secret`.
pub const SECRET_ENV_VAR: &str = "GUARD_HMAC_SECRET";
/// Environment variable overriding `vendor.api_key`.
pub const VENDOR_API_KEY_ENV_VAR: &str = "VENDOR_API_KEY";
/// Environment variable overriding `vendor.secret_key`.
pub const VENDOR_SECRET_KEY_ENV_VAR: &str = "VENDOR_SECRET_KEY";
/// Environment variable overriding `vendor.base_url`.
pub const VENDOR_BASE_URL_ENV_VAR: &str = "VENDOR_BASE_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

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

/// Load and validate configuration from a TOML file.
///
/// A missing file yields the defaults. Secrets from the environment override
/// the file before validation.
pub fn load_config(path: &Path) -> Result<GuardConfig, ConfigError> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
        GuardConfig::default()
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply overrides from a variable lookup (the process environment in production).
pub fn apply_env_overrides<F>(config: &mut GuardConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(secret) = non_empty(SECRET_ENV_VAR) {
        config.guard.secret = secret;
    }
    if let Some(key) = non_empty(VENDOR_API_KEY_ENV_VAR) {
        config.vendor.api_key = key;
    }
    if let Some(key) = non_empty(VENDOR_SECRET_KEY_ENV_VAR) {
        config.vendor.secret_key = key;
    }
    if let Some(url) = non_empty(VENDOR_BASE_URL_ENV_VAR) {
        config.vendor.base_url = url;
    }
}
