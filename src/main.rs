//! CEP weather service.
//!
//! Resolves a Brazilian postal code (CEP) to its city, then reports the
//! city's current temperature in Celsius, Fahrenheit and Kelvin.
//!
//! # Architecture Overview
//!
//! ```text
//!   GET /weather?cep=
//!         │
//!         ▼
//!   ┌───────────┐        ┌───────────────┐        ┌──────────────────┐
//!   │ http      │  cep   │ CepClient     │  city  │ WeatherClient    │
//!   │ + cep gate│──────▶ │ (ViaCEP)      │──────▶ │ (WeatherAPI)     │
//!   └───────────┘        └───────────────┘        └──────────────────┘
//!                                                          │
//!                                                          ▼
//!                                    {"city", "temp_C", "temp_F", "temp_K"}
//!
//!   failures: bad cep 422, lookup 404, weather 500
//! ```
//!
//! Spans go to an OTLP collector when one is reachable at startup; otherwise
//! the service runs with tracing disabled.

use std::path::PathBuf;

use clap::Parser;

use cep_weather::config::ServiceRole;
use cep_weather::lifecycle;

#[derive(Parser)]
#[command(name = "cep-weather")]
#[command(about = "Current temperature for a Brazilian postal code", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    lifecycle::run(ServiceRole::Weather, cli.config.as_deref()).await
}
