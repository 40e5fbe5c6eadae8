//! Error responses.
//!
//! Every failure leaving either service goes through [`ApiError`], which owns
//! the status/message table. Handlers branch on the variant; the text is only
//! produced here.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::pipeline::PipelineError;

/// Failures reported to HTTP callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("invalid body")]
    InvalidBody,

    #[error("invalid zipcode")]
    InvalidCep,

    #[error("can not find zipcode")]
    CepNotFound,

    #[error("weather error")]
    WeatherUnavailable,

    #[error("weather service unreachable")]
    UpstreamUnreachable,
}

impl ApiError {
    pub fn status(self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidBody => StatusCode::BAD_REQUEST,
            ApiError::InvalidCep => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::CepNotFound => StatusCode::NOT_FOUND,
            ApiError::WeatherUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UpstreamUnreachable => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<&PipelineError> for ApiError {
    fn from(err: &PipelineError) -> Self {
        match err {
            PipelineError::CepNotFound { .. } => ApiError::CepNotFound,
            PipelineError::WeatherUnavailable { .. } => ApiError::WeatherUnavailable,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

/// Handler for any method a route does not accept. Never reads the body.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
