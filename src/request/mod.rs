//! Resilient request execution over a rotating credential pool.
//!
//! [`ResilientExecutor`] wraps a caller-supplied async operation that takes an
//! API key. Each attempt asks the shared [`KeyRotator`] for a key, runs the
//! operation, and on a credential failure marks the key failed and tries
//! again with the next one. Failures unrelated to the key are returned
//! immediately.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use clowds_core::request::{RequestError, ResilientExecutor};
//! use clowds_core::rotation::KeyRotator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let rotator = Arc::new(KeyRotator::new("youtube", ["k1", "k2"])?);
//! let executor = ResilientExecutor::new(rotator);
//!
//! let body = executor
//!     .execute(|key| async move {
//!         let url = format!("https://example.com/api?key={key}");
//!         let response = reqwest::get(&url)
//!             .await
//!             .map_err(|e| RequestError::from_send("https://example.com/api", e))?;
//!         if !response.status().is_success() {
//!             return Err(RequestError::http_status(
//!                 "https://example.com/api",
//!                 response.status().as_u16(),
//!             ));
//!         }
//!         response
//!             .text()
//!             .await
//!             .map_err(|e| RequestError::decode("https://example.com/api", e))
//!     })
//!     .await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

mod error;
mod retry;

pub use error::{ExecuteError, RequestError};
pub use retry::{
    ClassifyFailure, DEFAULT_EXHAUSTED_BACKOFF, DEFAULT_MAX_ATTEMPTS, FailureKind, RetryAttempt,
    RetryPolicy, classify_http_status,
};

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::rotation::{KeyRotator, mask_key};

/// Runs credentialed operations with key rotation and bounded retry.
#[derive(Debug, Clone)]
pub struct ResilientExecutor {
    rotator: Arc<KeyRotator>,
    policy: RetryPolicy,
}

impl ResilientExecutor {
    /// Creates an executor with the default [`RetryPolicy`].
    #[must_use]
    pub fn new(rotator: Arc<KeyRotator>) -> Self {
        Self::with_policy(rotator, RetryPolicy::default())
    }

    /// Creates an executor with a custom policy.
    #[must_use]
    pub fn with_policy(rotator: Arc<KeyRotator>, policy: RetryPolicy) -> Self {
        Self { rotator, policy }
    }

    /// Returns the shared rotator.
    #[must_use]
    pub fn rotator(&self) -> &Arc<KeyRotator> {
        &self.rotator
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `operation` using the policy's attempt bound.
    ///
    /// # Errors
    ///
    /// See [`ResilientExecutor::execute_with_attempts`].
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, ExecuteError<E>>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ClassifyFailure + Display,
    {
        self.execute_with_attempts(operation, self.policy.max_attempts())
            .await
    }

    /// Runs `operation` up to `max_attempts` times (at least once).
    ///
    /// On each credential failure the key is marked failed. If that leaves
    /// every key failed and another attempt follows, the executor sleeps for
    /// [`RetryPolicy::exhausted_delay`] first.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::NonRetryable`] on the first failure that is not
    /// credential-related, and [`ExecuteError::Exhausted`] with the last error
    /// once every attempt failed with a credential error.
    #[instrument(skip(self, operation), fields(pool = %self.rotator.label()))]
    pub async fn execute_with_attempts<T, E, F, Fut>(
        &self,
        mut operation: F,
        max_attempts: u32,
    ) -> Result<T, ExecuteError<E>>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ClassifyFailure + Display,
    {
        let max_attempts = max_attempts.max(1);
        let mut history = Vec::new();
        let mut attempt: u32 = 0;

        loop {
            let key = self.rotator.current_key();

            let error = match operation(key.clone()).await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempt = attempt + 1, "request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            history.push(RetryAttempt {
                attempt: attempt + 1,
                key_hint: mask_key(&key),
                error: error.to_string(),
            });

            if error.failure_kind() == FailureKind::Other {
                debug!(attempt = attempt + 1, error = %error, "non-credential failure, not retrying");
                return Err(ExecuteError::NonRetryable {
                    attempt: attempt + 1,
                    source: error,
                });
            }

            self.rotator.mark_failed(&key);

            if attempt + 1 >= max_attempts {
                warn!(attempts = max_attempts, last_error = %error, "retries exhausted");
                return Err(ExecuteError::Exhausted {
                    attempts: max_attempts,
                    source: error,
                    history,
                });
            }

            let stats = self.rotator.stats();
            if stats.exhausted() {
                let delay = self.policy.exhausted_delay(attempt);
                warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis(),
                    total = stats.total,
                    "All API keys exhausted, waiting before retry"
                );
                tokio::time::sleep(delay).await;
            } else {
                debug!(
                    attempt = attempt + 1,
                    failed = stats.failed,
                    total = stats.total,
                    "credential failure, retrying with next key"
                );
            }

            attempt += 1;
        }
    }
}
