//! Error types for credentialed API requests.
//!
//! [`RequestError`] is what the provider clients hand back to the executor;
//! [`ExecuteError`] is what the executor hands back to its caller.

use thiserror::Error;

use super::retry::RetryAttempt;

/// Errors produced by a single credentialed HTTP request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The service answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The request URL with credentials removed.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Network-level error (DNS, connection refused, TLS, etc.)
    #[error("network error calling {url}: {source}")]
    Network {
        /// The request URL with credentials removed.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The request did not complete within the client timeout.
    #[error("timeout calling {url}")]
    Timeout {
        /// The request URL with credentials removed.
        url: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("invalid response body from {url}: {source}")]
    Decode {
        /// The request URL with credentials removed.
        url: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },
}

impl RequestError {
    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Maps a send error to [`RequestError::Timeout`] or [`RequestError::Network`].
    ///
    /// The request URL is stripped from `source` since it may carry a key.
    pub fn from_send(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source: source.without_url(),
            }
        }
    }

    /// Creates a decode error, stripping the request URL from `source`.
    pub fn decode(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source: source.without_url(),
        }
    }

    /// Returns the HTTP status, if the service answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors returned by [`ResilientExecutor`](super::ResilientExecutor).
///
/// Both variants carry the underlying operation error; use
/// [`ExecuteError::into_source`] to recover it.
#[derive(Debug, Error)]
pub enum ExecuteError<E> {
    /// The operation failed for a reason unrelated to the credential.
    ///
    /// Returned on first occurrence without marking any key failed.
    #[error("request failed on attempt {attempt}: {source}")]
    NonRetryable {
        /// The 1-indexed attempt that failed.
        attempt: u32,
        /// The operation error.
        source: E,
    },

    /// Every attempt failed with a credential error.
    #[error("all {attempts} attempt(s) failed with credential errors; last error: {source}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The last operation error.
        source: E,
        /// One record per attempt, oldest first.
        history: Vec<RetryAttempt>,
    },
}

impl<E> ExecuteError<E> {
    /// Returns the underlying operation error.
    pub fn into_source(self) -> E {
        match self {
            Self::NonRetryable { source, .. } | Self::Exhausted { source, .. } => source,
        }
    }

    /// Borrows the underlying operation error.
    pub fn source_error(&self) -> &E {
        match self {
            Self::NonRetryable { source, .. } | Self::Exhausted { source, .. } => source,
        }
    }

    /// Returns true when retries ran out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let err = RequestError::http_status("https://api.example.com/search", 403);
        assert_eq!(err.to_string(), "HTTP 403 from https://api.example.com/search");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_timeout_has_no_status() {
        let err = RequestError::timeout("https://api.example.com");
        assert!(err.to_string().contains("timeout"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_execute_error_into_source() {
        let err: ExecuteError<RequestError> = ExecuteError::NonRetryable {
            attempt: 1,
            source: RequestError::http_status("u", 500),
        };
        assert!(!err.is_exhausted());
        assert_eq!(err.into_source().status(), Some(500));
    }

    #[test]
    fn test_exhausted_display_mentions_attempts() {
        let err: ExecuteError<RequestError> = ExecuteError::Exhausted {
            attempts: 3,
            source: RequestError::http_status("u", 403),
            history: Vec::new(),
        };
        assert!(err.is_exhausted());
        assert!(err.to_string().contains("all 3 attempt(s)"));
        assert_eq!(err.source_error().status(), Some(403));
    }
}
