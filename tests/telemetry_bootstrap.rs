//! Tracing bootstrap against reachable, unreachable and malformed collectors.

use std::time::{Duration, Instant};

use axum::Router;
use opentelemetry::trace::{SpanKind, TraceContextExt};
use opentelemetry::Context;
use tokio::net::TcpListener;

use cep_weather::observability::{init_tracing, TelemetryState};
use cep_weather::resilience::RetryPolicy;

mod common;

fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(5, Duration::from_millis(200), Duration::from_millis(20))
}

#[tokio::test]
async fn test_unreachable_collector_degrades_after_all_attempts() {
    let refused = common::refused_addr().await;
    let policy = fast_policy();

    let start = Instant::now();
    let handle = init_tracing("service-b", &refused.to_string(), &policy).await;

    assert_eq!(handle.state(), TelemetryState::Degraded);
    assert_eq!(handle.attempts(), 5);
    assert!(start.elapsed() <= policy.max_total_duration() + Duration::from_secs(1));

    let telemetry = handle.telemetry();
    assert!(!telemetry.is_enabled());
    let span = telemetry.start_span("viaCEP.lookup", SpanKind::Client, &Context::new());
    assert!(!span.context().has_active_span());
    drop(span);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_malformed_endpoint_degrades_without_dialing() {
    let handle = init_tracing("service-a", "http://[::1", &fast_policy()).await;

    assert_eq!(handle.state(), TelemetryState::Degraded);
    assert_eq!(handle.attempts(), 0);
    handle.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reachable_collector_activates() {
    // Any HTTP/2-capable listener completes the dial.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, Router::new()).await;
    });

    let handle = init_tracing("service-b", &addr.to_string(), &fast_policy()).await;

    assert_eq!(handle.state(), TelemetryState::Active);
    assert_eq!(handle.attempts(), 1);

    let telemetry = handle.telemetry();
    assert!(telemetry.is_enabled());
    let span = telemetry.start_span("GET /weather", SpanKind::Server, &Context::new());
    assert!(span.context().has_active_span());
    drop(span);

    tokio::time::timeout(Duration::from_secs(15), handle.shutdown())
        .await
        .unwrap();
}
