//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound business call:
//!     → timeouts.rs (shared client with per-call deadline)
//!     → failure is classified by the caller, never retried
//!
//! Infrastructure bootstrap (tracing collector):
//!     → retries.rs (bounded attempts, per-attempt deadline, fixed delay)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retry policy for business calls is left to the caller of the service

pub mod retries;
pub mod timeouts;

pub use retries::{retry_with_policy, AttemptError, RetryExhausted, RetryPolicy};
