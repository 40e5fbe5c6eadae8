//! Externally visible failure kinds of the pipeline.

use thiserror::Error;

use crate::upstream::{LookupError, UpstreamFailure};

/// Why a CEP could not be turned into a weather report.
///
/// Every lookup failure collapses into `CepNotFound`: callers cannot tell an
/// unknown CEP from an unavailable lookup service. The distinction survives
/// in logs and in the `lookup.outcome` span attribute.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("can not find zipcode")]
    CepNotFound { cause: LookupError },

    #[error("weather error")]
    WeatherUnavailable { cause: UpstreamFailure },
}

impl PipelineError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::CepNotFound { .. } => "cep_not_found",
            PipelineError::WeatherUnavailable { .. } => "weather_unavailable",
        }
    }
}

impl From<LookupError> for PipelineError {
    fn from(cause: LookupError) -> Self {
        PipelineError::CepNotFound { cause }
    }
}

impl From<UpstreamFailure> for PipelineError {
    fn from(cause: UpstreamFailure) -> Self {
        PipelineError::WeatherUnavailable { cause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_lookup_failures_collapse() {
        let not_found = PipelineError::from(LookupError::NotFound);
        let unavailable = PipelineError::from(LookupError::Unavailable(UpstreamFailure::Status(
            StatusCode::INTERNAL_SERVER_ERROR,
        )));

        assert_eq!(not_found.to_string(), unavailable.to_string());
        assert_eq!(not_found.kind(), "cep_not_found");
        assert_eq!(unavailable.kind(), "cep_not_found");
    }

    #[test]
    fn test_weather_failure() {
        let err = PipelineError::from(UpstreamFailure::Status(StatusCode::UNAUTHORIZED));
        assert_eq!(err.kind(), "weather_unavailable");
        assert_eq!(err.to_string(), "weather error");
    }
}
