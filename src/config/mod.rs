//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (ServiceConfig::default)
//!     → optional TOML file (--config)
//!     → loader.rs (environment overrides)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → cloned into each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults matching the reference deployment
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, LoadedConfig, RejectedOverride, ServiceRole};
pub use schema::{
    GatewayConfig, ListenerConfig, ObservabilityConfig, ServiceConfig, TelemetryConfig,
    TimeoutConfig, UpstreamConfig,
};
