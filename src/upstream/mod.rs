//! Clients for the external collaborators.
//!
//! # Data Flow
//! ```text
//! PostalCode
//!     → cep_client.rs (GET {base}/{cep}/json/) → place | NotFound | Unavailable
//!     → weather_client.rs (GET {base}/current.json?key&q) → °C | Unavailable
//! ```
//!
//! Both clients share one `reqwest::Client` (connection pool, per-call
//! deadline) and emit one client span per call.

mod dto;

pub mod cep_client;
pub mod error;
pub mod weather_client;

pub use cep_client::CepClient;
pub use error::{LookupError, UpstreamFailure};
pub use weather_client::WeatherClient;
