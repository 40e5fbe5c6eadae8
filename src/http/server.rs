//! HTTP server for the weather pipeline.
//!
//! # Responsibilities
//! - Create the Axum router for `GET /weather?cep=`
//! - Wire up middleware (request ID, tracing, inbound timeout)
//! - Run the Validation Gate before any remote call
//! - Open the server span and hand its context to the pipeline
//! - Serve until the shutdown broadcast fires

use std::io;
use std::time::{Duration, Instant};

use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{on, MethodFilter},
    Json, Router,
};
use opentelemetry::trace::SpanKind;
use opentelemetry::KeyValue;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::cep::PostalCode;
use crate::config::ServiceConfig;
use crate::http::request::{self, propagate_request_id_layer, set_request_id_layer};
use crate::http::response::{method_not_allowed, ApiError};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::observability::Telemetry;
use crate::resilience::timeouts::request_timeout;
use crate::pipeline::{PipelineError, WeatherPipeline};

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: WeatherPipeline,
    pub telemetry: Telemetry,
}

/// HTTP server for the weather pipeline.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ServiceConfig, pipeline: WeatherPipeline, telemetry: Telemetry) -> Self {
        let state = AppState { pipeline, telemetry };
        let timeout = request_timeout(&config.timeouts);
        Self {
            router: Self::build_router(state, timeout),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/weather", on(MethodFilter::GET, weather_handler).fallback(method_not_allowed))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The router, for driving the service in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> io::Result<()> {
        serve(listener, self.router, shutdown).await
    }
}

/// Serve `router` on `listener` until `shutdown` fires, then drain.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: broadcast::Receiver<()>,
) -> io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown::wait(shutdown))
        .await?;

    tracing::info!(address = %addr, "HTTP server stopped");
    Ok(())
}

/// First `cep` value of a raw query string, percent-decoded.
fn cep_param(query: Option<&str>) -> String {
    query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "cep")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default()
}

async fn weather_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let response = lookup_weather(&state, query.as_deref(), &headers).await;
    metrics::record_request("pipeline", response.status().as_u16(), start);
    response
}

async fn lookup_weather(state: &AppState, query: Option<&str>, headers: &HeaderMap) -> Response {
    let request_id = request::request_id(headers);
    let raw = cep_param(query);

    let cep = match PostalCode::parse(&raw) {
        Ok(cep) => cep,
        Err(e) => {
            tracing::debug!(request_id = %request_id, cep = %raw, "Rejected: {}", e);
            return ApiError::InvalidCep.into_response();
        }
    };

    let parent = state.telemetry.extract(headers);
    let span = state.telemetry.start_span("GET /weather", SpanKind::Server, &parent);
    span.set_attribute(KeyValue::new("cep", cep.to_string()));

    match state.pipeline.resolve(&cep, span.context()).await {
        Ok(report) => {
            span.set_attribute(KeyValue::new("http.status_code", 200_i64));
            tracing::info!(
                request_id = %request_id,
                cep = %cep,
                city = %report.city,
                temp_c = report.temp_c,
                "Weather resolved"
            );
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(err) => {
            let api = ApiError::from(&err);
            span.set_attribute(KeyValue::new("http.status_code", i64::from(api.status().as_u16())));
            span.set_error(err.to_string());
            match &err {
                PipelineError::CepNotFound { cause } => {
                    tracing::info!(request_id = %request_id, cep = %cep, cause = %cause, "CEP not resolved");
                }
                PipelineError::WeatherUnavailable { cause } => {
                    tracing::warn!(request_id = %request_id, cep = %cep, cause = %cause, "Weather lookup failed");
                }
            }
            api.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cep_param_first_value_wins() {
        assert_eq!(cep_param(Some("cep=01001000&cep=99999999")), "01001000");
    }

    #[test]
    fn test_cep_param_decodes() {
        assert_eq!(cep_param(Some("x=1&cep=0100%201000")), "0100 1000");
    }

    #[test]
    fn test_cep_param_missing() {
        assert_eq!(cep_param(None), "");
        assert_eq!(cep_param(Some("zip=01001000")), "");
    }
}
