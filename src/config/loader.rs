//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which service a configuration is being loaded for.
///
/// The two binaries share one schema but read their listening port from
/// different environment variables and use different defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
    /// The weather pipeline service.
    Weather,
    /// The validating gateway in front of it.
    Gateway,
}

impl ServiceRole {
    fn port_var(self) -> &'static str {
        match self {
            ServiceRole::Weather => "SERVICE_B_PORT",
            ServiceRole::Gateway => "SERVICE_A_PORT",
        }
    }

    fn default_port(self) -> u16 {
        match self {
            ServiceRole::Weather => 8081,
            ServiceRole::Gateway => 8080,
        }
    }

    /// Default `service.name` reported to the tracing collector.
    pub fn default_service_name(self) -> &'static str {
        match self {
            ServiceRole::Weather => "service-b",
            ServiceRole::Gateway => "service-a",
        }
    }
}

/// An environment value that was present but could not be applied.
///
/// Returned rather than logged, since configuration is loaded before the
/// subscriber is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOverride {
    pub var: &'static str,
    pub value: String,
}

/// A validated configuration plus the overrides that were skipped.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ServiceConfig,
    pub rejected: Vec<RejectedOverride>,
}

/// Load configuration: role defaults, then an optional TOML file, then the
/// environment, then semantic validation.
pub fn load_config(path: Option<&Path>, role: ServiceRole) -> Result<LoadedConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config_file(path, role)?,
        None => {
            let mut config = ServiceConfig::default();
            config.listener.port = role.default_port();
            config
        }
    };

    let rejected = apply_env_overrides(&mut config, role, |key| std::env::var(key).ok());
    if config.telemetry.service_name.is_empty() {
        config.telemetry.service_name = role.default_service_name().to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(LoadedConfig { config, rejected })
}

/// Parse a config file, keeping the role's port when the file sets none.
fn read_config_file(path: &Path, role: ServiceRole) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let file: toml::Value = toml::from_str(&content)?;
    let sets_port = file
        .get("listener")
        .and_then(|listener| listener.get("port"))
        .is_some();

    let mut config: ServiceConfig = file.try_into()?;
    if !sets_port {
        config.listener.port = role.default_port();
    }
    Ok(config)
}

/// Apply environment overrides through `lookup`, ignoring empty values.
/// Values that are set but unusable are returned for the caller to report.
///
/// Taking the lookup as a closure keeps tests independent of the process
/// environment.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, role: ServiceRole, lookup: F) -> Vec<RejectedOverride>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|value| !value.is_empty());
    let mut rejected = Vec::new();

    if let Some(port) = var(role.port_var()) {
        match port.parse() {
            Ok(port) => config.listener.port = port,
            Err(_) => rejected.push(RejectedOverride {
                var: role.port_var(),
                value: port,
            }),
        }
    }
    if let Some(url) = var("SERVICE_B_URL") {
        config.gateway.forward_url = url;
    }
    if let Some(url) = var("CEP_API_BASE_URL") {
        config.upstream.cep_base_url = url;
    }
    if let Some(url) = var("WEATHER_API_BASE_URL") {
        config.upstream.weather_base_url = url;
    }
    if let Some(key) = var("WEATHERAPI_KEY") {
        config.upstream.weather_api_key = key;
    }
    if let Some(endpoint) = var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        config.telemetry.endpoint = endpoint;
    }
    if let Some(name) = var("OTEL_SERVICE_NAME") {
        config.telemetry.service_name = name;
    }
    if let Some(level) = var("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = var("LOG_FORMAT") {
        config.observability.log_format = format;
    }
    if let Some(addr) = var("METRICS_ADDRESS") {
        config.observability.metrics_address = Some(addr);
    }
    rejected
}
