//! Resilience patterns for the generation client
//!
//! Every remote call runs under a per-attempt timeout, and the timed
//! attempts are retried with exponential backoff. Exhausting the retry bound
//! yields the last transport error to the caller.

mod retry;

pub use retry::{RetryConfig, RetryExecutor};

use std::future::Future;
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::{AgentError, Result};

/// A unified resilience facade composing timeout and retry
#[derive(Debug, Clone)]
pub struct Resilience {
    retry: RetryExecutor,
    attempt_timeout: Duration,
}

impl Default for Resilience {
    fn default() -> Self {
        Self::new(RetryConfig::default(), Duration::from_secs(30))
    }
}

impl Resilience {
    /// Create a new resilience facade
    pub fn new(retry_config: RetryConfig, attempt_timeout: Duration) -> Self {
        Self {
            retry: RetryExecutor::new(retry_config),
            attempt_timeout,
        }
    }

    /// Build the policy described by a client configuration
    pub fn from_config(config: &GeminiConfig) -> Self {
        let retry = RetryConfig {
            max_retries: config.max_retries,
            ..RetryConfig::default()
        };
        Self::new(retry, config.timeout)
    }

    /// Execute a fallible operation with all configured resilience patterns
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let limit = self.attempt_timeout;
        self.retry
            .execute(|| {
                let attempt = operation();
                async move {
                    match tokio::time::timeout(limit, attempt).await {
                        Ok(result) => result,
                        Err(_) => Err(AgentError::timeout(format!("attempt exceeded {:?}", limit))),
                    }
                }
            })
            .await
    }

    /// Per-attempt timeout
    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Configure the retry executor
    pub fn configure_retry(&mut self, config: RetryConfig) {
        self.retry = RetryExecutor::new(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_slow_attempt_times_out_and_retries() {
        let attempts = AtomicUsize::new(0);
        let resilience = Resilience::new(
            RetryConfig {
                max_retries: 1,
                initial_interval: Duration::from_millis(5),
                ..RetryConfig::default()
            },
            Duration::from_millis(20),
        );

        let result: Result<()> = resilience
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err.root(), AgentError::Timeout(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = GeminiConfig {
            api_key: "k".to_string(),
            timeout: Duration::from_secs(12),
            max_retries: 0,
            ..GeminiConfig::default()
        };
        let resilience = Resilience::from_config(&config);
        assert_eq!(resilience.attempt_timeout(), Duration::from_secs(12));

        let result = resilience.execute(|| async { Ok::<_, AgentError>("ok") }).await;
        assert_eq!(result.unwrap(), "ok");
    }
}
