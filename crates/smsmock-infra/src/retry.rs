//! Bounded, fixed-delay retry
//!
//! The render → encode → upload chain is re-run as a whole. Errors that report
//! themselves as non-recoverable end the loop immediately.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use smsmock_core::{Config, ErrorMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_attempts, config.retry_delay())
    }

    /// Single attempt, no sleeping
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

/// Run `attempt_fn` until it succeeds, fails with a non-recoverable error, or the
/// policy's attempts are used up. The closure receives the 1-based attempt number.
/// The last error is returned on terminal failure.
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, operation: &str, mut attempt_fn: F) -> Result<T, E>
where
    E: ErrorMetadata + Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match attempt_fn(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if !err.is_recoverable() => {
                tracing::debug!(operation, attempt, error = %err, "Non-recoverable failure, not retrying");
                return Err(err);
            }
            Err(err) if attempt >= policy.max_attempts => {
                tracing::error!(
                    operation,
                    attempts = attempt,
                    error = %err,
                    "All attempts failed"
                );
                return Err(err);
            }
            Err(err) => {
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %err,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
