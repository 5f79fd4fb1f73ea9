//! Retry with exponential backoff for recoverable errors
//!
//! Transient failures talking to the generation service (network, timeout,
//! rate limit, 5xx) are retried a bounded number of times. Everything else is
//! returned on the first attempt.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use backoff::{backoff::Backoff, ExponentialBackoff};

use crate::error::{AgentError, Result};

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 means no retries)
    pub max_retries: u32,

    /// Initial backoff duration
    pub initial_interval: Duration,

    /// Maximum backoff duration
    pub max_interval: Duration,

    /// Multiplier for backoff between retries
    pub multiplier: f64,

    /// Whether to add randomization to backoff intervals
    pub randomization_factor: f64,

    /// Maximum total time to spend retrying
    pub max_elapsed_time: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            multiplier: 2.0,
            randomization_factor: 0.2,
            max_elapsed_time: Some(Duration::from_secs(90)),
        }
    }
}

impl RetryConfig {
    /// Policy that runs the operation exactly once
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

impl fmt::Display for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RetryConfig {{ max_retries: {}, initial_interval: {:?}, max_interval: {:?}, multiplier: {} }}",
            self.max_retries, self.initial_interval, self.max_interval, self.multiplier
        )
    }
}

/// Executor for retry operations with exponential backoff
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create a new retry executor with the specified configuration
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute a fallible operation with retries according to the configuration
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = ExponentialBackoff {
            current_interval: self.config.initial_interval,
            initial_interval: self.config.initial_interval,
            max_interval: self.config.max_interval,
            multiplier: self.config.multiplier,
            randomization_factor: self.config.randomization_factor,
            max_elapsed_time: self.config.max_elapsed_time,
            ..ExponentialBackoff::default()
        };

        let mut attempts = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if self.should_retry(&err) && attempts < self.config.max_retries => {
                    if let Some(backoff_duration) = backoff.next_backoff() {
                        log::warn!(
                            "Operation failed with retryable error, retrying in {:?} (attempt {}/{}): {}",
                            backoff_duration,
                            attempts + 1,
                            self.config.max_retries,
                            err
                        );

                        tokio::time::sleep(backoff_duration).await;
                        attempts += 1;
                    } else {
                        // Max elapsed time exceeded
                        return Err(err.with_context_value("attempts", attempts + 1));
                    }
                }
                Err(err) => {
                    if attempts > 0 {
                        return Err(err.with_context_value("attempts", attempts + 1));
                    }
                    return Err(err);
                }
            }
        }
    }

    fn should_retry(&self, error: &AgentError) -> bool {
        error.is_retryable()
    }

    /// Get the current retry configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(20),
            ..RetryConfig::default()
        }
    }

    #[tokio::test]
    async fn test_successful_operation() {
        let retry = RetryExecutor::default();
        let result = retry.execute(|| async { Ok::<_, AgentError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retry_on_failure() {
        let attempt_count = AtomicUsize::new(0);
        let retry = RetryExecutor::new(fast_config(1));

        let result = retry
            .execute(|| async {
                if attempt_count.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(AgentError::network("connection reset"))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_retry_on_non_retryable_error() {
        let attempt_count = AtomicUsize::new(0);
        let retry = RetryExecutor::new(fast_config(3));

        let result: Result<()> = retry
            .execute(|| async {
                attempt_count.fetch_add(1, Ordering::SeqCst);
                Err(AgentError::configuration("no key"))
            })
            .await;

        assert!(result.unwrap_err().is_fatal());
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_max_retries_exceeded() {
        let attempt_count = AtomicUsize::new(0);
        let retry = RetryExecutor::new(fast_config(1));

        let result: Result<()> = retry
            .execute(|| async {
                attempt_count.fetch_add(1, Ordering::SeqCst);
                Err(AgentError::service("503 Service Unavailable"))
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_transport_failure());
        // Initial attempt + 1 retry
        assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
    }
}
