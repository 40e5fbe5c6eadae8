//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!     → telemetry.rs (spans exported to the OTLP collector)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//!     → Tracing collector (optional; absence degrades to no-op)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID and trace context flow through both services
//! - Telemetry failures are contained here and never fail a request

pub mod logging;
pub mod metrics;
pub mod telemetry;

pub use telemetry::{init_tracing, Telemetry, TelemetryError, TelemetryState, TraceSpan, TracerHandle};
