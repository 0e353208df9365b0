//! Observer hook for key rotation state changes.
//!
//! The rotator never prints; it reports [`RotationEvent`]s to a
//! [`RotationObserver`] and the host decides how to surface them.
//! [`TracingObserver`] is the default and emits `tracing` events.

use tracing::{debug, info, warn};

/// Number of leading characters of a key that may appear in logs or events.
const KEY_HINT_CHARS: usize = 10;

/// A state change inside a [`KeyRotator`](super::KeyRotator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationEvent {
    /// A key was marked failed and the cursor advanced.
    KeyFailed {
        /// Masked form of the failed key (see [`mask_key`]).
        key_hint: String,
        /// Cursor position after advancing.
        cursor: usize,
        /// Distinct failed keys after marking.
        failed: usize,
        /// Pool size.
        total: usize,
    },
    /// The cooldown elapsed with every key failed; the failed set was cleared.
    CooldownReset {
        /// Number of keys that recovered.
        recovered: usize,
    },
    /// The failed set was cleared by an explicit call.
    ManualReset {
        /// Number of keys that recovered.
        recovered: usize,
    },
    /// The cursor was advanced without a failure.
    Rotated {
        /// Cursor position after advancing.
        cursor: usize,
    },
}

/// Receives rotation events for one credential pool.
///
/// Callbacks run after the rotator has released its internal lock, so an
/// observer may call back into the rotator (e.g. to read stats).
pub trait RotationObserver: Send + Sync {
    /// Called once per state change. `pool` is the rotator's label.
    fn on_event(&self, pool: &str, event: &RotationEvent);
}

/// Observer that reports events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RotationObserver for TracingObserver {
    fn on_event(&self, pool: &str, event: &RotationEvent) {
        match event {
            RotationEvent::KeyFailed {
                key_hint,
                cursor,
                failed,
                total,
            } => warn!(pool, key = %key_hint, cursor, failed, total, "API key failed"),
            RotationEvent::CooldownReset { recovered } => {
                info!(pool, recovered, "Resetting failed API keys after cooldown period");
            }
            RotationEvent::ManualReset { recovered } => {
                info!(pool, recovered, "Manually reset all failed API keys");
            }
            RotationEvent::Rotated { cursor } => debug!(pool, cursor, "Rotated to key index"),
        }
    }
}

/// Masks a credential for display, keeping only its first characters.
///
/// ```
/// use clowds_core::rotation::mask_key;
///
/// assert_eq!(mask_key("AIzaSyA-1234567890abcdef"), "AIzaSyA-12...");
/// assert_eq!(mask_key("short"), "short...");
/// ```
#[must_use]
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(KEY_HINT_CHARS).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key_truncates_to_ten_chars() {
        let masked = mask_key("0123456789SECRET");
        assert_eq!(masked, "0123456789...");
        assert!(!masked.contains("SECRET"));
    }

    #[test]
    fn test_mask_key_handles_multibyte() {
        assert_eq!(mask_key("ключключключ"), "ключключкл...");
    }

    #[test]
    fn test_tracing_observer_accepts_all_events() {
        let observer = TracingObserver;
        observer.on_event("test", &RotationEvent::Rotated { cursor: 1 });
        observer.on_event("test", &RotationEvent::CooldownReset { recovered: 2 });
        observer.on_event("test", &RotationEvent::ManualReset { recovered: 0 });
        observer.on_event(
            "test",
            &RotationEvent::KeyFailed {
                key_hint: mask_key("abc"),
                cursor: 0,
                failed: 1,
                total: 2,
            },
        );
    }
}
