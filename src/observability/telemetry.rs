//! Distributed tracing bootstrap and span emission.
//!
//! # Responsibilities
//! - Dial the OTLP/gRPC collector with bounded retries
//! - Build a batching exporter with an always-on sampler when the dial succeeds
//! - Degrade to no-op tracing when it does not, without failing startup
//! - Hand out a cheap [`Telemetry`] capability that components use to emit spans
//! - Extract and inject W3C trace context on HTTP headers
//!
//! # State Machine
//! ```text
//! Connecting → Active    (a dial attempt succeeded, exporter installed)
//! Connecting → Degraded  (attempts exhausted or exporter could not be built)
//! ```
//!
//! # Design Decisions
//! - [`TracerHandle`] is owned by the process; `shutdown(self)` consumes it, so
//!   the exporter is flushed at most once and a degraded handle is a no-op
//! - Components receive a [`Telemetry`] by value instead of reaching for the
//!   global tracer provider
//! - Context propagation works even when degraded so that trace ids survive
//!   across services

use std::time::Duration;

use axum::http::HeaderMap;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::{SpanKind, Status, TraceContextExt, Tracer as _, TracerProvider as _};
use opentelemetry::{global, Context, KeyValue};
use opentelemetry_otlp::{SpanExporter, WithTonicConfig};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{self as sdktrace, Sampler};
use opentelemetry_sdk::{runtime, Resource};
use thiserror::Error;
use tonic::transport::{Channel, Endpoint};

use crate::http::request::{HeaderExtractor, HeaderInjector};
use crate::observability::metrics;
use crate::resilience::{retry_with_policy, AttemptError, RetryPolicy};

/// Instrumentation scope name for spans emitted by this crate.
const INSTRUMENTATION_NAME: &str = "cep-weather";

/// Errors that can occur while bootstrapping telemetry.
///
/// None of these ever reach a caller; they only decide between
/// `Active` and `Degraded`.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid collector endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("collector connection failed: {0}")]
    Connect(#[from] tonic::transport::Error),

    #[error("collector dial timed out after {0:?}")]
    Timeout(Duration),

    #[error("exporter setup failed: {0}")]
    Exporter(String),
}

/// Which state the bootstrap settled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryState {
    /// Spans are batched and exported to the collector.
    Active,
    /// Tracing calls are accepted and discarded.
    Degraded,
}

/// Process-wide owner of the span export pipeline.
pub struct TracerHandle {
    state: TelemetryState,
    attempts: u32,
    provider: Option<sdktrace::TracerProvider>,
    telemetry: Telemetry,
}

impl TracerHandle {
    /// A handle with tracing disabled.
    pub fn disabled() -> Self {
        Self {
            state: TelemetryState::Degraded,
            attempts: 0,
            provider: None,
            telemetry: Telemetry::disabled(),
        }
    }

    pub fn state(&self) -> TelemetryState {
        self.state
    }

    /// Dial attempts made during bootstrap.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The span-emitting capability to inject into components.
    pub fn telemetry(&self) -> Telemetry {
        self.telemetry.clone()
    }

    /// Flush and close the exporter. No-op when degraded.
    pub async fn shutdown(self) {
        let Some(provider) = self.provider else {
            tracing::debug!("Telemetry degraded, nothing to flush");
            return;
        };

        // Flushing blocks on the batch processor, keep it off the executor.
        match tokio::task::spawn_blocking(move || provider.shutdown()).await {
            Ok(Ok(())) => tracing::info!("Telemetry flushed and closed"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Telemetry shutdown reported an error"),
            Err(e) => tracing::warn!(error = %e, "Telemetry shutdown task failed"),
        }
    }
}

impl std::fmt::Debug for TracerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracerHandle")
            .field("state", &self.state)
            .field("attempts", &self.attempts)
            .finish()
    }
}

/// Initialize tracing for `service_name`, exporting to `endpoint`.
///
/// Never fails: if the collector cannot be reached within `policy`, the
/// returned handle is degraded and the service keeps starting.
pub async fn init_tracing(service_name: &str, endpoint: &str, policy: &RetryPolicy) -> TracerHandle {
    let started = std::time::Instant::now();
    let (channel, attempts) = match connect_collector(endpoint, policy).await {
        Ok(connected) => connected,
        Err((e, attempts)) => {
            tracing::warn!(
                endpoint = %endpoint,
                attempts,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "Tracing disabled: collector unreachable"
            );
            return degraded(attempts);
        }
    };

    let provider = match build_provider(service_name, channel) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::warn!(error = %e, "Tracing disabled: exporter setup failed");
            return degraded(attempts);
        }
    };

    global::set_tracer_provider(provider.clone());
    global::set_text_map_propagator(TraceContextPropagator::new());
    metrics::record_telemetry_state(TelemetryState::Active);

    tracing::info!(
        service_name = %service_name,
        endpoint = %endpoint,
        attempts,
        "Tracing initialized"
    );

    let telemetry = Telemetry {
        tracer: Some(provider.tracer(INSTRUMENTATION_NAME)),
    };

    TracerHandle {
        state: TelemetryState::Active,
        attempts,
        provider: Some(provider),
        telemetry,
    }
}

fn degraded(attempts: u32) -> TracerHandle {
    metrics::record_telemetry_state(TelemetryState::Degraded);
    TracerHandle {
        attempts,
        ..TracerHandle::disabled()
    }
}

/// Add `http://` when the endpoint is given as bare `host:port`.
pub fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

async fn connect_collector(
    endpoint: &str,
    policy: &RetryPolicy,
) -> Result<(Channel, u32), (TelemetryError, u32)> {
    let uri = normalize_endpoint(endpoint);
    let endpoint = Endpoint::from_shared(uri.clone())
        .map_err(|_| (TelemetryError::InvalidEndpoint(uri), 0))?
        .connect_timeout(policy.attempt_timeout);

    retry_with_policy(policy, |attempt| {
        let endpoint = endpoint.clone();
        async move {
            tracing::debug!(attempt, uri = %endpoint.uri(), "Dialing tracing collector");
            endpoint.connect().await.map_err(TelemetryError::from)
        }
    })
    .await
    .map_err(|exhausted| {
        let attempts = exhausted.attempts;
        let error = match exhausted.last_error {
            AttemptError::Failed(e) => e,
            AttemptError::TimedOut(after) => TelemetryError::Timeout(after),
        };
        (error, attempts)
    })
}

fn build_provider(
    service_name: &str,
    channel: Channel,
) -> Result<sdktrace::TracerProvider, TelemetryError> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_channel(channel)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let resource = Resource::new(vec![KeyValue::new("service.name", service_name.to_string())]);

    Ok(sdktrace::TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_config(
            sdktrace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_resource(resource),
        )
        .build())
}

/// The capability to emit spans and propagate trace context.
///
/// Cloning is cheap. A disabled `Telemetry` accepts every call and records
/// nothing.
#[derive(Clone, Default)]
pub struct Telemetry {
    tracer: Option<sdktrace::Tracer>,
}

impl Telemetry {
    pub fn disabled() -> Self {
        Self { tracer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tracer.is_some()
    }

    /// Start a span named `name` as a child of `parent`.
    pub fn start_span(&self, name: &'static str, kind: SpanKind, parent: &Context) -> TraceSpan {
        match &self.tracer {
            Some(tracer) => {
                let span = tracer
                    .span_builder(name)
                    .with_kind(kind)
                    .start_with_context(tracer, parent);
                TraceSpan {
                    cx: parent.with_span(span),
                    owned: true,
                }
            }
            None => TraceSpan {
                cx: parent.clone(),
                owned: false,
            },
        }
    }

    /// Read the W3C trace context carried by inbound `headers`.
    pub fn extract(&self, headers: &HeaderMap) -> Context {
        TraceContextPropagator::new().extract(&HeaderExtractor(headers))
    }

    /// Write the trace context of `cx` into outbound `headers`.
    pub fn inject(&self, cx: &Context, headers: &mut HeaderMap) {
        TraceContextPropagator::new().inject_context(cx, &mut HeaderInjector(headers));
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// A started span. Ends when dropped.
pub struct TraceSpan {
    cx: Context,
    owned: bool,
}

impl TraceSpan {
    /// Context to parent child spans on, or to inject downstream.
    pub fn context(&self) -> &Context {
        &self.cx
    }

    pub fn set_attribute(&self, attribute: KeyValue) {
        if self.owned {
            self.cx.span().set_attribute(attribute);
        }
    }

    /// Mark the span failed.
    pub fn set_error(&self, description: impl Into<String>) {
        if self.owned {
            self.cx.span().set_status(Status::error(description.into()));
        }
    }
}

impl Drop for TraceSpan {
    fn drop(&mut self) {
        if self.owned {
            self.cx.span().end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(normalize_endpoint("otel-collector:4317"), "http://otel-collector:4317");
        assert_eq!(normalize_endpoint("https://collector:4317"), "https://collector:4317");
    }

    #[test]
    fn test_disabled_spans_are_noops() {
        let telemetry = Telemetry::disabled();
        let parent = Context::new();
        let span = telemetry.start_span("noop", SpanKind::Internal, &parent);
        span.set_attribute(KeyValue::new("cep", "01001000"));
        span.set_error("ignored");
        assert!(!span.context().has_active_span());
    }

    #[test]
    fn test_context_propagates_while_disabled() {
        let telemetry = Telemetry::disabled();
        let mut inbound = HeaderMap::new();
        inbound.insert(
            "traceparent",
            HeaderValue::from_static("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"),
        );

        let cx = telemetry.extract(&inbound);
        let span = telemetry.start_span("forward", SpanKind::Client, &cx);

        let mut outbound = HeaderMap::new();
        telemetry.inject(span.context(), &mut outbound);
        assert_eq!(
            outbound.get("traceparent").unwrap(),
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"
        );
    }

    #[test]
    fn test_inject_without_context_writes_nothing() {
        let mut headers = HeaderMap::new();
        Telemetry::disabled().inject(&Context::new(), &mut headers);
        assert!(headers.get("traceparent").is_none());
    }

    #[tokio::test]
    async fn test_disabled_handle_shutdown_is_noop() {
        let handle = TracerHandle::disabled();
        assert_eq!(handle.state(), TelemetryState::Degraded);
        assert!(!handle.telemetry().is_enabled());
        handle.shutdown().await;
    }
}
