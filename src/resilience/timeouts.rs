//! Timeout enforcement.
//!
//! Every outbound business call goes through the shared `reqwest::Client`
//! built here, which carries the upstream deadline. Inbound requests are
//! bounded by a `TimeoutLayer` on each router.

use std::time::Duration;

use crate::config::TimeoutConfig;

/// Cap on establishing a TCP connection to an upstream.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline for one outbound call.
pub fn upstream_timeout(config: &TimeoutConfig) -> Duration {
    Duration::from_secs(config.upstream_secs)
}

/// Deadline for handling one inbound request.
pub fn request_timeout(config: &TimeoutConfig) -> Duration {
    Duration::from_secs(config.request_secs)
}

/// Build the process-wide HTTP client (connection pool) for outbound calls.
pub fn build_http_client(config: &TimeoutConfig) -> Result<reqwest::Client, reqwest::Error> {
    let timeout = upstream_timeout(config);
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .build()
}
