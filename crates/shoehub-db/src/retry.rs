//! # Retry With Backoff
//!
//! Re-runs an operation that lost a race with another writer.
//!
//! ```text
//! attempt 1 ──► Conflict ──► sleep 20ms
//! attempt 2 ──► Conflict ──► sleep 40ms
//! attempt 3 ──► Ok(order)            (any non-Conflict error stops at once)
//! ```
//!
//! Only errors with [`DbError::is_retryable`] are retried.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::{DbError, DbResult};

/// Backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first one. At least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Delay growth per attempt.
    pub multiplier: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: 8,
            initial_delay: Duration::from_millis(20),
            max_delay: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

impl RetryConfig {
    /// Default delays with a different attempt budget.
    pub fn with_attempts(max_attempts: u32) -> Self {
        RetryConfig {
            max_attempts: max_attempts.max(1),
            ..RetryConfig::default()
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        RetryConfig::with_attempts(1)
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        delay.saturating_mul(self.multiplier).min(self.max_delay)
    }
}

/// Runs `operation` until it succeeds, fails permanently, or runs out of
/// attempts. The attempt number (starting at 1) is passed in.
pub async fn retry_with_backoff<F, Fut, T>(
    config: RetryConfig,
    what: &str,
    mut operation: F,
) -> DbResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;
        debug!(operation = what, attempt, max_attempts, "Attempting operation");

        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    info!(operation = what, attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) if attempt >= max_attempts => {
                error!(
                    operation = what,
                    attempt,
                    error = %err,
                    "Operation failed after all retries"
                );
                return Err(err);
            }
            Err(err) => {
                warn!(
                    operation = what,
                    attempt,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Operation conflicted, retrying after delay"
                );
                sleep(delay).await;
                delay = config.next_delay(delay);
            }
        }
    }
}
