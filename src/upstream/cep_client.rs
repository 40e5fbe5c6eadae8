//! Postal-code lookup client.
//!
//! Resolves a CEP to a place name with one GET to `{base}/{cep}/json/` and
//! classifies the outcome as found, not found, or unavailable.

use opentelemetry::trace::SpanKind;
use opentelemetry::{Context, KeyValue};
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::Client;
use url::Url;

use super::dto::CepResponseDto;
use super::error::{LookupError, UpstreamFailure};
use crate::cep::PostalCode;
use crate::observability::metrics;
use crate::observability::Telemetry;

/// Reqwest-backed lookup client bound to one base URL.
#[derive(Debug, Clone)]
pub struct CepClient {
    http: Client,
    base_url: String,
    telemetry: Telemetry,
}

impl CepClient {
    /// # Errors
    ///
    /// Returns an error when `base_url` is not an absolute URL.
    pub fn new(http: Client, base_url: &str, telemetry: Telemetry) -> Result<Self, url::ParseError> {
        Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            telemetry,
        })
    }

    fn lookup_url(&self, cep: &PostalCode) -> String {
        format!("{}/{}/json/", self.base_url, cep)
    }

    /// Resolve `cep` to a place name, as a child span of `parent`.
    pub async fn lookup(&self, cep: &PostalCode, parent: &Context) -> Result<String, LookupError> {
        let span = self.telemetry.start_span("viaCEP.lookup", SpanKind::Client, parent);
        span.set_attribute(KeyValue::new("cep", cep.to_string()));

        let mut headers = HeaderMap::new();
        self.telemetry.inject(span.context(), &mut headers);

        let result = self.fetch(cep, headers).await;
        let outcome = match &result {
            Ok(city) => {
                span.set_attribute(KeyValue::new("city", city.clone()));
                tracing::debug!(cep = %cep, city = %city, "CEP resolved");
                "found"
            }
            Err(e @ LookupError::NotFound) => {
                tracing::debug!(cep = %cep, "CEP not found");
                e.outcome()
            }
            Err(e @ LookupError::Unavailable(failure)) => {
                if let Some(code) = failure.status_code() {
                    span.set_attribute(KeyValue::new("http.status_code", i64::from(code)));
                }
                span.set_error(failure.to_string());
                tracing::warn!(cep = %cep, error = %failure, "CEP lookup failed");
                e.outcome()
            }
        };
        span.set_attribute(KeyValue::new("lookup.outcome", outcome));
        metrics::record_upstream("cep", outcome);

        result
    }

    async fn fetch(&self, cep: &PostalCode, headers: HeaderMap) -> Result<String, LookupError> {
        let response = self
            .http
            .get(self.lookup_url(cep))
            .headers(headers)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(UpstreamFailure::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamFailure::Status(status).into());
        }

        let body = response.bytes().await.map_err(UpstreamFailure::from)?;
        let decoded: CepResponseDto = serde_json::from_slice(&body).map_err(UpstreamFailure::from)?;
        decoded.into_place().ok_or(LookupError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_url_shape() {
        let client = CepClient::new(Client::new(), "https://viacep.com.br/ws/", Telemetry::disabled())
            .unwrap();
        let cep = PostalCode::parse("01001000").unwrap();
        assert_eq!(client.lookup_url(&cep), "https://viacep.com.br/ws/01001000/json/");
    }

    #[test]
    fn test_rejects_relative_base_url() {
        assert!(CepClient::new(Client::new(), "viacep/ws", Telemetry::disabled()).is_err());
    }
}
