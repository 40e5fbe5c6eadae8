//! CEP → city → temperature orchestration.
//!
//! # Data Flow
//! ```text
//! PostalCode (already validated)
//!     → CepClient::lookup        NotFound | Unavailable → CepNotFound
//!     → WeatherClient::current_temperature   failure    → WeatherUnavailable
//!     → WeatherReport::from_celsius
//! ```
//!
//! # Design Decisions
//! - Strictly sequential: the weather call only runs after a successful lookup
//! - All-or-nothing: no partial report is ever returned
//! - No retries; a single failed call ends the request

pub mod error;
pub mod report;

use opentelemetry::Context;

use crate::cep::PostalCode;
use crate::upstream::{CepClient, WeatherClient};

pub use error::PipelineError;
pub use report::WeatherReport;

/// The two-stage pipeline. Cheap to clone; shared by all request handlers.
#[derive(Debug, Clone)]
pub struct WeatherPipeline {
    cep: CepClient,
    weather: WeatherClient,
}

impl WeatherPipeline {
    pub fn new(cep: CepClient, weather: WeatherClient) -> Self {
        Self { cep, weather }
    }

    /// Resolve `cep` to a weather report. Spans are parented on `cx`.
    pub async fn resolve(&self, cep: &PostalCode, cx: &Context) -> Result<WeatherReport, PipelineError> {
        let city = self.cep.lookup(cep, cx).await?;
        let temp_c = self.weather.current_temperature(&city, cx).await?;
        Ok(WeatherReport::from_celsius(city, temp_c))
    }
}
