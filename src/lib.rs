//! CEP weather library: postal-code validation, the lookup → weather
//! pipeline, its HTTP surfaces and the telemetry bootstrap.

// Domain
pub mod cep;
pub mod pipeline;
pub mod upstream;

// Surfaces
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use cep::PostalCode;
pub use config::schema::ServiceConfig;
pub use http::{GatewayServer, HttpServer};
pub use lifecycle::Shutdown;
pub use pipeline::{WeatherPipeline, WeatherReport};
