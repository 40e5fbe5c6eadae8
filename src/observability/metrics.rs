//! Metrics collection and exposition.
//!
//! # Metrics
//! - `weather_requests_total` (counter): inbound requests by endpoint, status
//! - `weather_request_duration_seconds` (histogram): inbound latency by endpoint
//! - `weather_upstream_calls_total` (counter): outbound calls by upstream, outcome
//! - `weather_telemetry_active` (gauge): 1 when spans are exported, 0 when degraded
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::observability::telemetry::TelemetryState;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled inbound request.
pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    counter!(
        "weather_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("weather_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Record one outbound call to a collaborator.
pub fn record_upstream(upstream: &'static str, outcome: &'static str) {
    counter!(
        "weather_upstream_calls_total",
        "upstream" => upstream,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_telemetry_state(state: TelemetryState) {
    let value = match state {
        TelemetryState::Active => 1.0,
        TelemetryState::Degraded => 0.0,
    };
    gauge!("weather_telemetry_active").set(value);
}
