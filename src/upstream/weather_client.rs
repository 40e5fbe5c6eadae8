//! Current-weather client.
//!
//! Queries `{base}/current.json?key=..&q=<place>` for a place returned by the
//! lookup client. There is no semantic miss here: any failure is
//! infrastructure-level.

use opentelemetry::trace::SpanKind;
use opentelemetry::{Context, KeyValue};
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::Client;
use url::Url;

use super::dto::WeatherResponseDto;
use super::error::UpstreamFailure;
use crate::observability::metrics;
use crate::observability::Telemetry;

/// Reqwest-backed weather client bound to one base URL and credential.
#[derive(Clone)]
pub struct WeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
    telemetry: Telemetry,
}

impl WeatherClient {
    /// # Errors
    ///
    /// Returns an error when `base_url` is not an absolute URL.
    pub fn new(
        http: Client,
        base_url: &str,
        api_key: impl Into<String>,
        telemetry: Telemetry,
    ) -> Result<Self, url::ParseError> {
        Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            telemetry,
        })
    }

    /// Current temperature in Celsius for `place`, as a child span of `parent`.
    pub async fn current_temperature(&self, place: &str, parent: &Context) -> Result<f64, UpstreamFailure> {
        let span = self.telemetry.start_span("weatherAPI.current", SpanKind::Client, parent);
        span.set_attribute(KeyValue::new("city", place.to_string()));

        let mut headers = HeaderMap::new();
        self.telemetry.inject(span.context(), &mut headers);

        let result = self.fetch(place, headers).await;
        match &result {
            Ok(temp_c) => {
                tracing::debug!(city = %place, temp_c, "Temperature fetched");
                metrics::record_upstream("weather", "found");
            }
            Err(failure) => {
                if let Some(code) = failure.status_code() {
                    span.set_attribute(KeyValue::new("http.status_code", i64::from(code)));
                }
                span.set_error(failure.to_string());
                tracing::warn!(city = %place, error = %failure, "Weather lookup failed");
                metrics::record_upstream("weather", failure.kind());
            }
        }

        result
    }

    async fn fetch(&self, place: &str, headers: HeaderMap) -> Result<f64, UpstreamFailure> {
        let response = self
            .http
            .get(format!("{}/current.json", self.base_url))
            .query(&[("key", self.api_key.as_str()), ("q", place)])
            .headers(headers)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamFailure::Status(status));
        }

        let body = response.bytes().await?;
        let decoded: WeatherResponseDto = serde_json::from_slice(&body)?;
        Ok(decoded.current.temp_c)
    }
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_credential() {
        let client = WeatherClient::new(
            Client::new(),
            "http://api.weatherapi.com/v1",
            "secret-key",
            Telemetry::disabled(),
        )
        .unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("api.weatherapi.com"));
    }
}
