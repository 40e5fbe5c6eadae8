//! Outcome classification for remote calls.

use reqwest::StatusCode;
use thiserror::Error;

/// An infrastructure-level failure talking to a collaborator.
///
/// Covers everything except a semantic "not found": the collaborator could
/// not be reached, answered with a non-2xx status, or sent a body that did
/// not decode.
#[derive(Debug, Error)]
pub enum UpstreamFailure {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("undecodable body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl UpstreamFailure {
    /// The HTTP status observed from the collaborator, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            UpstreamFailure::Status(status) => Some(status.as_u16()),
            UpstreamFailure::Transport(e) => e.status().map(|s| s.as_u16()),
            UpstreamFailure::Decode(_) => None,
        }
    }

    /// Short label used in metrics and span attributes.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamFailure::Transport(e) if e.is_timeout() => "timeout",
            UpstreamFailure::Transport(_) => "transport",
            UpstreamFailure::Status(_) => "status",
            UpstreamFailure::Decode(_) => "decode",
        }
    }
}

/// Failure of a postal-code lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The collaborator answered but knows no place for this code.
    #[error("postal code not found")]
    NotFound,

    #[error("lookup unavailable: {0}")]
    Unavailable(#[from] UpstreamFailure),
}

impl LookupError {
    /// Label recorded as `lookup.outcome`; keeps the two failure kinds
    /// distinguishable in telemetry even though callers see one outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            LookupError::NotFound => "not_found",
            LookupError::Unavailable(_) => "unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_failure_reports_code() {
        let failure = UpstreamFailure::Status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(failure.status_code(), Some(503));
        assert_eq!(failure.kind(), "status");
        assert_eq!(failure.to_string(), "unexpected status 503 Service Unavailable");
    }

    #[test]
    fn test_decode_failure_has_no_status() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let failure = UpstreamFailure::from(err);
        assert_eq!(failure.status_code(), None);
        assert_eq!(failure.kind(), "decode");
    }

    #[test]
    fn test_lookup_outcomes_are_distinct() {
        assert_eq!(LookupError::NotFound.outcome(), "not_found");
        let unavailable = LookupError::from(UpstreamFailure::Status(StatusCode::BAD_GATEWAY));
        assert_eq!(unavailable.outcome(), "unavailable");
    }
}
