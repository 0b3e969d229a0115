//! Retry logic for transient weather-gateway failures.
//!
//! A failure is transient only when the gateway reports upstream
//! unavailability (see [`Error::is_transient`]); everything else
//! propagates immediately. Backoff is linear: `base_delay * attempt`
//! with 1-based attempt numbers.
//!
//! Only forecast fetches are wrapped in [`with_retry`]; current-weather
//! fetches are deliberately single-attempt so the primary display panel
//! never flickers between stale and fresh data mid-cycle. The polling
//! scheduler's own timer provides the long-horizon retry when this
//! policy gives up.
//!
//! # Example
//!
//! ```
//! use skycast_core::{RetryConfig, with_retry, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! let config = RetryConfig::default();
//!
//! let result = with_retry(&config, "forecast", || async {
//!     // Your gateway call here
//!     Ok::<_, Error>(42)
//! }).await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first (1 means no retries).
    pub max_attempts: u32,
    /// Base delay; attempt `n` waits `base_delay * n` before retrying.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryConfig {
    /// Create a retry config with a custom attempt budget.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Set the base delay.
    #[must_use]
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Calculate the delay after a given 1-based attempt number.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Execute an async operation, retrying transient failures.
///
/// The operation closure is invoked once per attempt, which makes the
/// attempt count directly observable in tests (count invocations inside
/// the closure). Non-transient errors and the final transient error are
/// propagated unchanged.
pub async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 1..=config.max_attempts {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(e) => {
                if !e.is_transient() {
                    return Err(e);
                }

                last_error = Some(e);

                if attempt < config.max_attempts {
                    let delay = config.delay_for_attempt(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}",
                        operation_name, attempt, config.max_attempts, delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| Error::InvalidConfig("retry budget of zero attempts".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::STATUS_UNAVAILABLE;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> Error {
        Error::Service {
            code: STATUS_UNAVAILABLE,
            message: "upstream unavailable".to_string(),
        }
    }

    fn permanent() -> Error {
        Error::Service {
            code: 3,
            message: "invalid argument".to_string(),
        }
    }

    #[test]
    fn test_linear_backoff() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(2000));

        let custom = RetryConfig::new(5).base_delay(Duration::from_millis(250));
        assert_eq!(custom.delay_for_attempt(3), Duration::from_millis(750));
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let config = RetryConfig::default();
        let result = with_retry(&config, "test", || async { Ok::<_, Error>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_transient_failures_then_success() {
        let config = RetryConfig::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = Arc::clone(&attempts);

        let result = with_retry(&config, "test", || {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                let count = attempts.fetch_add(1, Ordering::SeqCst);
                if count < 2 { Err(transient()) } else { Ok(42) }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_propagate_final_error() {
        let config = RetryConfig::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = Arc::clone(&attempts);

        let result: Result<i32> = with_retry(&config, "test", || {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(Error::Service {
                code: STATUS_UNAVAILABLE,
                ..
            })
        ));
        // No 4th attempt after the budget is spent
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let config = RetryConfig::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = Arc::clone(&attempts);

        let result: Result<i32> = with_retry(&config, "test", || {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(permanent())
            }
        })
        .await;

        assert!(matches!(result, Err(Error::Service { code: 3, .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
