//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;

use cep_weather::config::ServiceConfig;
use cep_weather::http::{serve, GatewayServer, HttpServer};
use cep_weather::lifecycle::{build_pipeline, Shutdown};
use cep_weather::observability::Telemetry;
use cep_weather::resilience::timeouts::build_http_client;

/// A request as seen by a mock upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub uri: Uri,
    pub headers: HeaderMap,
}

/// A running mock upstream with a call counter.
pub struct MockUpstream {
    pub addr: SocketAddr,
    calls: Arc<AtomicU32>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<Recorded> {
        self.requests.lock().unwrap().last().cloned()
    }
}

/// Start a programmable mock upstream on an ephemeral port. Every request,
/// whatever its method or path, is answered by `f` with a JSON body.
pub async fn start_programmable_backend<F>(f: F) -> MockUpstream
where
    F: Fn(&Uri) -> (u16, String) + Send + Sync + 'static,
{
    let calls = Arc::new(AtomicU32::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let handler = {
        let calls = calls.clone();
        let requests = requests.clone();
        move |uri: Uri, headers: HeaderMap| {
            let calls = calls.clone();
            let requests = requests.clone();
            let f = f.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let (status, body) = f(&uri);
                requests.lock().unwrap().push(Recorded { uri, headers });
                (
                    StatusCode::from_u16(status).unwrap(),
                    [(header::CONTENT_TYPE, "application/json")],
                    body,
                )
            }
        }
    };

    let router = Router::new().fallback(handler);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    MockUpstream { addr, calls, requests }
}

/// Start a mock upstream that always answers `status` with `body`.
pub async fn start_mock_backend(status: u16, body: impl Into<String>) -> MockUpstream {
    let body = body.into();
    start_programmable_backend(move |_| (status, body.clone())).await
}

/// Start a mock upstream that counts requests and never answers them.
pub async fn start_stalled_backend() -> MockUpstream {
    let calls = Arc::new(AtomicU32::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let handler = {
        let calls = calls.clone();
        move || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                std::future::pending::<()>().await
            }
        }
    };

    let router = Router::new().fallback(handler);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    MockUpstream { addr, calls, requests }
}

/// An address nothing listens on.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// ViaCEP-style body for a known CEP.
pub fn cep_found(city: &str) -> String {
    format!(
        r#"{{"cep":"01001-000","logradouro":"Praça da Sé","localidade":"{}","uf":"SP"}}"#,
        city
    )
}

/// WeatherAPI-style body for a Celsius reading.
pub fn weather_found(temp_c: f64) -> String {
    format!(
        r#"{{"location":{{"name":"Sao Paulo"}},"current":{{"temp_c":{:?},"temp_f":0.0}}}}"#,
        temp_c
    )
}

/// Configuration pointing the pipeline at the given upstreams.
pub fn pipeline_config(cep_base: &str, weather_base: &str) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.upstream.cep_base_url = cep_base.to_string();
    config.upstream.weather_base_url = weather_base.to_string();
    config.upstream.weather_api_key = "test-key".to_string();
    config.timeouts.upstream_secs = 2;
    config
}

/// Build the pipeline service's router in-process.
pub fn pipeline_router(config: &ServiceConfig) -> Router {
    let http = build_http_client(&config.timeouts).unwrap();
    let pipeline = build_pipeline(config, http, Telemetry::disabled()).unwrap();
    HttpServer::new(config, pipeline, Telemetry::disabled()).router()
}

/// Build the gateway's router in-process, forwarding to `forward_url`.
pub fn gateway_router(forward_url: &str) -> Router {
    let mut config = ServiceConfig::default();
    config.gateway.forward_url = forward_url.to_string();
    config.timeouts.upstream_secs = 2;
    let http = build_http_client(&config.timeouts).unwrap();
    GatewayServer::new(&config, http, Telemetry::disabled())
        .unwrap()
        .router()
}

/// Serve `router` on an ephemeral port until `shutdown` fires.
pub async fn spawn_router(router: Router, shutdown: &Shutdown) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = serve(listener, router, rx).await;
    });
    addr
}
