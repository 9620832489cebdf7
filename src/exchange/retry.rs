//! Bounded retry for the network step of an exchange

use crate::config::RetryConfig;
use crate::error::ExchangeError;
use std::future::Future;
use std::time::Duration;

/// Fixed-delay retry policy
///
/// `max_attempts` counts the first try, so `1` means no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, at least 1
    pub max_attempts: u32,
    /// Pause between consecutive attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Try once, never retry
    pub fn single() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Three attempts, one second apart
    pub fn standard() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }

    /// Build from configuration
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: Duration::from_millis(config.delay_ms),
        }
    }

    /// Run `attempt` until it succeeds, fails with a non-retryable error, or
    /// the attempt budget is spent
    ///
    /// `attempt` receives the 1-based attempt number. The last error is
    /// returned when every attempt fails.
    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> Result<T, ExchangeError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ExchangeError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut number = 1;

        loop {
            match attempt(number).await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() || number >= max_attempts => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        "Attempt {}/{} failed: {}; retrying in {:?}",
                        number,
                        max_attempts,
                        e,
                        self.delay
                    );
                    tokio::time::sleep(self.delay).await;
                    number += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = RetryPolicy::standard()
            .run(|n| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 3 {
                        Err(ExchangeError::NetworkError("reset".into()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_error_when_budget_spent() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = RetryPolicy::standard()
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ExchangeError::Timeout) }
            })
            .await;

        assert_eq!(result, Err(ExchangeError::Timeout));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_application_error_is_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = RetryPolicy::standard()
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ExchangeError::ApplicationError("bad input".into())) }
            })
            .await;

        assert!(matches!(result, Err(ExchangeError::ApplicationError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_policy_tries_once() {
        let calls = AtomicU32::new(0);

        let _: Result<(), _> = RetryPolicy::single()
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ExchangeError::NetworkError("refused".into())) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config_clamps_zero_attempts() {
        let policy = RetryPolicy::from_config(&RetryConfig {
            max_attempts: 0,
            delay_ms: 250,
        });
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay, Duration::from_millis(250));
    }
}
