//! Configuration validation.
//!
//! Serde handles syntax; this module checks values: URLs parse, timeouts and
//! retry bounds are non-zero. Every failure is reported, not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is not a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} is empty")]
    Empty { field: &'static str },
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("upstream.cep_base_url", &config.upstream.cep_base_url),
        ("upstream.weather_base_url", &config.upstream.weather_base_url),
        ("gateway.forward_url", &config.gateway.forward_url),
    ] {
        if Url::parse(value).is_err() {
            errors.push(ValidationError::InvalidUrl {
                field,
                value: value.clone(),
            });
        }
    }

    for (field, value) in [
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("telemetry.attempt_timeout_secs", config.telemetry.attempt_timeout_secs),
        ("telemetry.max_attempts", u64::from(config.telemetry.max_attempts)),
        ("gateway.max_body_bytes", config.gateway.max_body_bytes as u64),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if config.telemetry.endpoint.trim().is_empty() {
        errors.push(ValidationError::Empty {
            field: "telemetry.endpoint",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
