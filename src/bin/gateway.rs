//! Validating gateway in front of the CEP weather service.
//!
//! Accepts `POST /weather` with `{"cep": "..."}`, rejects malformed input
//! locally and relays everything else to the weather service unchanged.

use std::path::PathBuf;

use clap::Parser;

use cep_weather::config::ServiceRole;
use cep_weather::lifecycle;

#[derive(Parser)]
#[command(name = "cep-gateway")]
#[command(about = "Input-validating gateway for the CEP weather service", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    lifecycle::run(ServiceRole::Gateway, cli.config.as_deref()).await
}
