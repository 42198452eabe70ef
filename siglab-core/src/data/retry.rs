//! Bounded retry for provider calls.
//!
//! External sources may block or fail; callers retry with a fixed attempt
//! count and a fixed inter-attempt delay, then degrade. `Unavailable` is
//! never retried — missing data is an answer, not a failure.

use super::provider::DataError;
use std::time::Duration;
use tracing::warn;

/// Fixed-count, fixed-delay retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// A policy that never sleeps. Used by tests and the deterministic
    /// backtest path, where the in-memory sources cannot transiently fail.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            attempts,
            delay: Duration::ZERO,
        }
    }
}

/// Run `op` under `policy`, retrying on `DataError::Service` only.
///
/// Exhausted retries return the last error; the caller decides how to
/// degrade (the engine substitutes an empty result and holds).
pub fn with_retry<T>(
    policy: RetryPolicy,
    label: &str,
    mut op: impl FnMut() -> Result<T, DataError>,
) -> Result<T, DataError> {
    let mut last = None;
    for attempt in 1..=policy.attempts.max(1) {
        match op() {
            Ok(value) => return Ok(value),
            Err(err @ DataError::Unavailable { .. }) => return Err(err),
            Err(err) => {
                warn!(%err, attempt, label, "provider call failed");
                last = Some(err);
                if attempt < policy.attempts && !policy.delay.is_zero() {
                    std::thread::sleep(policy.delay);
                }
            }
        }
    }
    Err(last.unwrap_or_else(|| DataError::Service("retry with zero attempts".into())))
}
