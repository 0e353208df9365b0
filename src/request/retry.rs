//! Retry policy and failure classification for credentialed requests.
//!
//! When an attempt fails, the error is classified into a [`FailureKind`]:
//! - [`FailureKind::Credential`] - the key was rejected (quota, permission,
//!   invalid key); the key is marked failed and the request retried
//! - [`FailureKind::Other`] - anything else; returned to the caller as-is
//!
//! The [`RetryPolicy`] bounds the number of attempts and computes the pause
//! taken when every key in the pool has been marked failed.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use clowds_core::request::{ClassifyFailure, FailureKind, RequestError, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//! assert_eq!(policy.max_attempts(), 3);
//! assert_eq!(policy.exhausted_delay(0), Duration::from_millis(2000));
//! assert_eq!(policy.exhausted_delay(1), Duration::from_millis(4000));
//!
//! let err = RequestError::http_status("https://example.com", 403);
//! assert_eq!(err.failure_kind(), FailureKind::Credential);
//! ```

use std::time::Duration;

use super::RequestError;

/// Default maximum attempts per executor call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default backoff step applied when the pool is exhausted (2 seconds).
pub const DEFAULT_EXHAUSTED_BACKOFF: Duration = Duration::from_millis(2000);

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The credential was rejected; rotate and retry.
    ///
    /// Examples: HTTP 403 (quota exceeded, key disabled), HTTP 400 (invalid key).
    Credential,

    /// Not related to the credential; do not retry.
    ///
    /// Examples: 5xx errors, timeouts, connection failures, bad JSON.
    Other,
}

/// Errors that can tell the executor whether the credential was at fault.
pub trait ClassifyFailure {
    /// Returns how this failure should be handled.
    fn failure_kind(&self) -> FailureKind;
}

impl ClassifyFailure for RequestError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            Self::HttpStatus { status, .. } => classify_http_status(*status),
            Self::Network { .. } | Self::Timeout { .. } | Self::Decode { .. } => FailureKind::Other,
        }
    }
}

/// Classifies an HTTP status code.
///
/// | Status | Kind | Rationale |
/// |--------|------|-----------|
/// | 400 | Credential | Invalid or malformed key parameter |
/// | 403 | Credential | Quota exhausted or key lacks permission |
/// | other | Other | Not fixed by switching keys |
#[must_use]
pub fn classify_http_status(status: u16) -> FailureKind {
    match status {
        400 | 403 => FailureKind::Credential,
        _ => FailureKind::Other,
    }
}

/// Bounds and backoff for one executor call.
///
/// # Default Values
///
/// - `max_attempts`: 3
/// - `exhausted_backoff`: 2 seconds
///
/// # Delay Calculation
///
/// ```text
/// delay = exhausted_backoff * (attempt + 1)    // attempt is 0-indexed
/// ```
///
/// The delay is only applied when every key in the pool is marked failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    exhausted_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            exhausted_backoff: DEFAULT_EXHAUSTED_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with custom settings. `max_attempts` is raised to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, exhausted_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            exhausted_backoff,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using the default backoff.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self::new(max_attempts, DEFAULT_EXHAUSTED_BACKOFF)
    }

    /// Returns the maximum number of attempts.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the backoff step.
    #[must_use]
    pub fn exhausted_backoff(&self) -> Duration {
        self.exhausted_backoff
    }

    /// Returns the pause after the 0-indexed `attempt` when the pool is exhausted.
    #[must_use]
    pub fn exhausted_delay(&self, attempt: u32) -> Duration {
        self.exhausted_backoff.saturating_mul(attempt.saturating_add(1))
    }
}

/// Record of one attempt inside an executor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAttempt {
    /// 1-indexed attempt number.
    pub attempt: u32,
    /// Masked key used for the attempt.
    pub key_hint: String,
    /// Display form of the error.
    pub error: String,
}
