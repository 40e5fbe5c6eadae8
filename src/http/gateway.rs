//! The validating gateway: `POST /weather {"cep": "..."}`.
//!
//! # Data Flow
//! ```text
//! POST body → decode (400) → Validation Gate (422)
//!     → GET {forward_url}?cep=  with traceparent + x-request-id
//!     → relay status and body unmodified   (transport failure → 502)
//! ```

use std::io;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use opentelemetry::trace::SpanKind;
use opentelemetry::KeyValue;
use reqwest::Client;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;

use crate::cep::{CepRequest, PostalCode};
use crate::config::ServiceConfig;
use crate::http::request::{self, propagate_request_id_layer, set_request_id_layer, X_REQUEST_ID};
use crate::http::response::{method_not_allowed, ApiError};
use crate::http::server::serve;
use crate::observability::metrics;
use crate::observability::Telemetry;
use crate::resilience::timeouts::request_timeout;

/// Handler state: the shared client and the pipeline's address.
#[derive(Debug, Clone)]
pub struct GatewayState {
    pub http: Client,
    pub forward_url: Url,
    pub telemetry: Telemetry,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    /// # Errors
    ///
    /// Returns an error when `gateway.forward_url` is not an absolute URL.
    pub fn new(config: &ServiceConfig, http: Client, telemetry: Telemetry) -> Result<Self, url::ParseError> {
        let state = GatewayState {
            http,
            forward_url: Url::parse(&config.gateway.forward_url)?,
            telemetry,
        };
        let timeout = request_timeout(&config.timeouts);
        Ok(Self {
            router: Self::build_router(state, timeout, config.gateway.max_body_bytes),
        })
    }

    #[allow(deprecated)]
    fn build_router(state: GatewayState, request_timeout: Duration, max_body_bytes: usize) -> Router {
        Router::new()
            .route("/weather", post(forward).fallback(method_not_allowed))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(max_body_bytes))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> io::Result<()> {
        serve(listener, self.router, shutdown).await
    }
}

async fn forward(State(state): State<GatewayState>, headers: HeaderMap, body: Bytes) -> Response {
    let start = Instant::now();
    let response = match relay(&state, &headers, &body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };
    metrics::record_request("gateway", response.status().as_u16(), start);
    response
}

async fn relay(state: &GatewayState, headers: &HeaderMap, body: &[u8]) -> Result<Response, ApiError> {
    let request_id = request::request_id(headers);

    let input: CepRequest = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(request_id = %request_id, error = %e, "Rejected undecodable body");
        ApiError::InvalidBody
    })?;
    let cep = PostalCode::parse(&input.cep).map_err(|e| {
        tracing::debug!(request_id = %request_id, cep = %input.cep, "Rejected: {}", e);
        ApiError::InvalidCep
    })?;

    let parent = state.telemetry.extract(headers);
    let span = state.telemetry.start_span("POST /weather", SpanKind::Server, &parent);
    span.set_attribute(KeyValue::new("cep", cep.to_string()));

    let mut url = state.forward_url.clone();
    url.query_pairs_mut().append_pair("cep", cep.as_str());

    let mut outbound = HeaderMap::new();
    state.telemetry.inject(span.context(), &mut outbound);
    if let Some(id) = headers.get(X_REQUEST_ID) {
        outbound.insert(X_REQUEST_ID, id.clone());
    }

    let unreachable = |e: reqwest::Error| {
        tracing::warn!(request_id = %request_id, cep = %cep, error = %e, "Weather service unreachable");
        span.set_error(e.to_string());
        metrics::record_upstream("weather_service", "unreachable");
        ApiError::UpstreamUnreachable
    };

    let upstream = state.http.get(url).headers(outbound).send().await.map_err(&unreachable)?;
    let status = upstream.status();
    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    let payload = upstream.bytes().await.map_err(&unreachable)?;

    span.set_attribute(KeyValue::new("http.status_code", i64::from(status.as_u16())));
    metrics::record_upstream("weather_service", "relayed");
    tracing::debug!(request_id = %request_id, cep = %cep, status = status.as_u16(), "Relayed");

    Ok((status, [(CONTENT_TYPE, content_type)], payload).into_response())
}
