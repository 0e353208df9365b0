//! Error types for credential pool construction.

use thiserror::Error;

/// Errors raised while building a [`KeyRotator`](super::KeyRotator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotatorError {
    /// Every supplied credential was empty or whitespace-only.
    #[error("no valid API keys provided for {pool}\n  Suggestion: {suggestion}")]
    EmptyPool {
        /// Label of the pool being built (e.g. "youtube").
        pool: String,
        /// How to fix the configuration.
        suggestion: String,
    },
}

impl RotatorError {
    /// Creates an `EmptyPool` error for the named pool.
    #[must_use]
    pub fn empty_pool(pool: &str) -> Self {
        Self::EmptyPool {
            pool: pool.to_string(),
            suggestion: "Set a comma-separated list of keys, e.g. KEY_ONE,KEY_TWO".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pool_message_names_pool() {
        let err = RotatorError::empty_pool("youtube");
        let message = err.to_string();
        assert!(message.contains("youtube"));
        assert!(message.contains("Suggestion"));
    }
}
