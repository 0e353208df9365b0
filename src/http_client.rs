//! Shared HTTP client construction policy for provider clients.
//!
//! Both providers reuse one [`reqwest::Client`] so timeouts, compression and
//! the User-Agent stay consistent.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::user_agent;

/// Default connect timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default overall request timeout (30 seconds).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect and read timeouts for provider requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// TCP/TLS connect timeout.
    pub connect: Duration,
    /// Whole-request timeout.
    pub read: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            read: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Builds the provider HTTP client.
///
/// # Errors
///
/// Returns the underlying [`reqwest::Error`] when the TLS backend or system
/// configuration cannot be initialized.
pub fn build_http_client(timeouts: HttpTimeouts) -> Result<Client, reqwest::Error> {
    debug!(
        connect_ms = timeouts.connect.as_millis(),
        read_ms = timeouts.read.as_millis(),
        "building provider HTTP client"
    );
    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.read)
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let timeouts = HttpTimeouts::default();
        assert_eq!(timeouts.connect, Duration::from_secs(10));
        assert_eq!(timeouts.read, Duration::from_secs(30));
    }

    #[test]
    fn test_build_http_client_succeeds() {
        assert!(build_http_client(HttpTimeouts::default()).is_ok());
    }
}
