//! Bounded retry with a per-attempt deadline.
//!
//! # Responsibilities
//! - Run an operation up to `max_attempts` times
//! - Bound every attempt with `attempt_timeout`
//! - Wait a fixed `delay` between attempts (never after the last one)
//!
//! # Design Decisions
//! - Used for infrastructure bootstrap only; business calls are never retried
//! - Fixed spacing instead of backoff: the collector is either coming up or it is not
//! - Worst-case duration is `max_attempts * attempt_timeout + (max_attempts - 1) * delay`

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::config::TelemetryConfig;

/// Retry bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Deadline applied to each attempt.
    pub attempt_timeout: Duration,
    /// Pause between consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, attempt_timeout: Duration, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            attempt_timeout,
            delay,
        }
    }

    /// Policy for dialing the tracing collector.
    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs(config.attempt_timeout_secs),
            Duration::from_secs(config.retry_delay_secs),
        )
    }

    /// Upper bound on the time `retry_with_policy` can take.
    pub fn max_total_duration(&self) -> Duration {
        self.attempt_timeout * self.max_attempts + self.delay * self.max_attempts.saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&TelemetryConfig::default())
    }
}

/// Why a single attempt failed.
#[derive(Debug, Error)]
pub enum AttemptError<E: fmt::Display> {
    #[error("attempt timed out after {0:?}")]
    TimedOut(Duration),

    #[error("{0}")]
    Failed(E),
}

/// Every attempt failed.
#[derive(Debug, Error)]
#[error("gave up after {attempts} attempts: {last_error}")]
pub struct RetryExhausted<E: fmt::Display> {
    pub attempts: u32,
    pub last_error: AttemptError<E>,
}

/// Run `op` until it succeeds or the policy is exhausted.
///
/// `op` receives the 1-based attempt number. On success returns the value and
/// the attempt number that produced it.
pub async fn retry_with_policy<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<(T, u32), RetryExhausted<E>>
where
    E: fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;

        let error = match tokio::time::timeout(policy.attempt_timeout, op(attempt)).await {
            Ok(Ok(value)) => return Ok((value, attempt)),
            Ok(Err(e)) => AttemptError::Failed(e),
            Err(_) => AttemptError::TimedOut(policy.attempt_timeout),
        };

        tracing::warn!(
            attempt,
            max_attempts = policy.max_attempts,
            error = %error,
            "Attempt failed"
        );

        if attempt >= policy.max_attempts {
            return Err(RetryExhausted {
                attempts: attempt,
                last_error: error,
            });
        }
        tokio::time::sleep(policy.delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(50), Duration::from_millis(5))
    }

    #[test]
    fn test_default_policy_bounds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.attempt_timeout, Duration::from_secs(5));
        assert_eq!(policy.delay, Duration::from_secs(2));
        assert_eq!(policy.max_total_duration(), Duration::from_secs(33));
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_exact_attempt_count() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: Result<((), u32), _> = retry_with_policy(&fast_policy(5), |_| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>("refused")
            }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert!(matches!(err.last_error, AttemptError::Failed("refused")));
    }

    #[tokio::test]
    async fn test_returns_first_success() {
        let (value, attempt) = retry_with_policy(&fast_policy(5), |attempt| async move {
            if attempt < 3 {
                Err("not yet")
            } else {
                Ok(attempt * 10)
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 30);
        assert_eq!(attempt, 3);
    }

    #[tokio::test]
    async fn test_hanging_attempt_is_bounded() {
        let policy = fast_policy(3);
        let start = Instant::now();

        let err = retry_with_policy(&policy, |_| async {
            std::future::pending::<Result<(), &str>>().await
        })
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 3);
        assert!(matches!(err.last_error, AttemptError::TimedOut(_)));
        assert!(start.elapsed() < policy.max_total_duration() + Duration::from_secs(1));
    }
}
