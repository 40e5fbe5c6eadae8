//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure shared by the
//! weather service and the gateway. All types derive Serde traits for
//! deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for both services.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// External collaborators queried by the weather pipeline.
    pub upstream: UpstreamConfig,

    /// Gateway forwarding settings.
    pub gateway: GatewayConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Telemetry bootstrap settings.
    pub telemetry: TelemetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind host (e.g., "0.0.0.0").
    pub host: String,

    /// Listening port.
    pub port: u16,
}

impl ListenerConfig {
    /// Socket address string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
        }
    }
}

/// Lookup and weather collaborator settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the postal-code lookup service.
    pub cep_base_url: String,

    /// Base URL of the weather service.
    pub weather_base_url: String,

    /// Credential sent to the weather service as the `key` query parameter.
    pub weather_api_key: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            cep_base_url: "https://viacep.com.br/ws".to_string(),
            weather_base_url: "http://api.weatherapi.com/v1".to_string(),
            weather_api_key: String::new(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Full URL of the weather service endpoint the gateway forwards to.
    pub forward_url: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            forward_url: "http://service-b:8081/weather".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Timeout configuration for inbound and outbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for every outbound business call in seconds.
    pub upstream_secs: u64,

    /// Deadline for handling one inbound request in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            upstream_secs: 10,
            request_secs: 30,
        }
    }
}

/// Telemetry bootstrap configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name reported in the `service.name` resource attribute.
    /// Empty means "use the binary's default name".
    pub service_name: String,

    /// OTLP/gRPC collector endpoint (e.g., "otel-collector:4317").
    pub endpoint: String,

    /// Total connection attempts before degrading to no-op tracing.
    pub max_attempts: u32,

    /// Per-attempt dial timeout in seconds.
    pub attempt_timeout_secs: u64,

    /// Delay between attempts in seconds.
    pub retry_delay_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            endpoint: "otel-collector:4317".to_string(),
            max_attempts: 5,
            attempt_timeout_secs: 5,
            retry_delay_secs: 2,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Prometheus scrape endpoint bind address. Metrics are off when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_address: None,
        }
    }
}
