//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Require the secrets the guard and vendor client depend on
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GuardConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("guard.secret must not be empty")]
    EmptySecret,

    #[error("{0} must not be empty")]
    MissingVendorKey(&'static str),

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("vendor.base_url is not a valid URL: {0}")]
    InvalidVendorUrl(String),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.guard.secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }
    if config.vendor.api_key.is_empty() {
        errors.push(ValidationError::MissingVendorKey("vendor.api_key"));
    }
    if config.vendor.secret_key.is_empty() {
        errors.push(ValidationError::MissingVendorKey("vendor.secret_key"));
    }

    if config.vendor.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "vendor.timeout_secs" });
    }
    if config.client.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "client.timeout_ms" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.request_secs" });
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if url::Url::parse(&config.vendor.base_url).is_err() {
        errors.push(ValidationError::InvalidVendorUrl(config.vendor.base_url.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
