//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging, metrics and tracing, in that order
//! - Build the shared HTTP client and the role's server
//! - Bind the listener and serve until shutdown
//! - Flush telemetry on the way out
//!
//! # Design Decisions
//! - Fail fast on configuration and bind errors
//! - An unreachable tracing collector is never fatal
//! - Listeners start last (traffic only when ready)

use std::error::Error;
use std::net::SocketAddr;
use std::path::Path;

use reqwest::Client;
use tokio::net::TcpListener;

use crate::config::{load_config, LoadedConfig, ServiceConfig, ServiceRole};
use crate::http::{GatewayServer, HttpServer};
use crate::lifecycle::Shutdown;
use crate::observability::{init_tracing, logging, metrics, Telemetry};
use crate::pipeline::WeatherPipeline;
use crate::resilience::timeouts::build_http_client;
use crate::resilience::RetryPolicy;
use crate::upstream::{CepClient, WeatherClient};

/// Wire the CEP and weather clients into a pipeline.
///
/// # Errors
///
/// Returns an error when either upstream base URL is not absolute.
pub fn build_pipeline(
    config: &ServiceConfig,
    http: Client,
    telemetry: Telemetry,
) -> Result<WeatherPipeline, url::ParseError> {
    let cep = CepClient::new(http.clone(), &config.upstream.cep_base_url, telemetry.clone())?;
    let weather = WeatherClient::new(
        http,
        &config.upstream.weather_base_url,
        config.upstream.weather_api_key.clone(),
        telemetry,
    )?;
    Ok(WeatherPipeline::new(cep, weather))
}

/// Run one service to completion: from configuration to drained shutdown.
pub async fn run(role: ServiceRole, config_path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let LoadedConfig { config, rejected } = load_config(config_path, role)?;
    logging::init_logging(&config.observability);
    for skipped in &rejected {
        tracing::warn!(var = skipped.var, value = %skipped.value, "Ignoring invalid environment value");
    }

    tracing::info!(
        service_name = %config.telemetry.service_name,
        version = env!("CARGO_PKG_VERSION"),
        "Starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );
    if role == ServiceRole::Weather && config.upstream.weather_api_key.is_empty() {
        tracing::warn!("WEATHERAPI_KEY is empty; weather lookups will be rejected upstream");
    }

    if let Some(address) = &config.observability.metrics_address {
        match address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(metrics_address = %address, error = %e, "Failed to parse metrics address"),
        }
    }

    let policy = RetryPolicy::from_config(&config.telemetry);
    let tracer = init_tracing(&config.telemetry.service_name, &config.telemetry.endpoint, &policy).await;

    let served = serve_role(role, &config, tracer.telemetry()).await;

    tracer.shutdown().await;
    served?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn serve_role(role: ServiceRole, config: &ServiceConfig, telemetry: Telemetry) -> Result<(), Box<dyn Error>> {
    let http = build_http_client(&config.timeouts)?;

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    match role {
        ServiceRole::Weather => {
            let pipeline = build_pipeline(config, http, telemetry.clone())?;
            HttpServer::new(config, pipeline, telemetry)
                .run(listener, shutdown.subscribe())
                .await?;
        }
        ServiceRole::Gateway => {
            GatewayServer::new(config, http, telemetry)?
                .run(listener, shutdown.subscribe())
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeoutConfig;

    #[test]
    fn test_build_pipeline_rejects_relative_url() {
        let mut config = ServiceConfig::default();
        config.upstream.cep_base_url = "viacep.com.br/ws".to_string();
        let http = build_http_client(&TimeoutConfig::default()).unwrap();

        assert!(build_pipeline(&config, http, Telemetry::disabled()).is_err());
    }

    #[test]
    fn test_build_pipeline_from_defaults() {
        let config = ServiceConfig::default();
        let http = build_http_client(&config.timeouts).unwrap();

        assert!(build_pipeline(&config, http, Telemetry::disabled()).is_ok());
    }
}
