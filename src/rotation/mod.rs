//! API key rotation with failure tracking and cooldown recovery.
//!
//! A [`KeyRotator`] owns an ordered, immutable pool of credentials together
//! with a cursor and a set of keys that have failed. Failed keys are skipped
//! by [`KeyRotator::current_key`] until either the whole pool has been failed
//! for longer than the cooldown window, or [`KeyRotator::reset_failed`] is
//! called.
//!
//! # Example
//!
//! ```
//! use clowds_core::rotation::KeyRotator;
//!
//! let rotator = KeyRotator::new("youtube", ["k1", "k2", "k3"]).unwrap();
//! rotator.mark_failed("k1");
//! rotator.mark_failed("k2");
//! assert_eq!(rotator.current_key(), "k3");
//! assert_eq!(rotator.stats().failed, 2);
//! ```
//!
//! # Concurrency
//!
//! All mutable state sits behind one mutex that is never held across an
//! `.await`, so cursor and failed-set updates are atomic when the rotator is
//! shared through `Arc` across tasks.

mod error;
mod observer;

pub use error::RotatorError;
pub use observer::{RotationEvent, RotationObserver, TracingObserver, mask_key};

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, instrument};

/// Default cooldown before an exhausted pool is retried (5 minutes).
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5 * 60);

/// Read-only snapshot of rotation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationStats {
    /// Number of entries in the pool (duplicates included).
    pub total: usize,
    /// Number of distinct keys currently marked failed.
    pub failed: usize,
    /// Current cursor position.
    pub cursor: usize,
    /// Number of distinct keys in the pool.
    pub distinct: usize,
}

impl RotationStats {
    /// Returns true when every distinct key in the pool is marked failed.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.failed >= self.distinct
    }
}

#[derive(Debug)]
struct RotationState {
    cursor: usize,
    failed: HashSet<String>,
    last_reset: Instant,
}

/// Thread-safe rotating credential pool.
pub struct KeyRotator {
    label: String,
    keys: Vec<String>,
    distinct: usize,
    cooldown: Duration,
    state: Mutex<RotationState>,
    observer: Arc<dyn RotationObserver>,
}

impl KeyRotator {
    /// Creates a rotator over `keys`, dropping empty and whitespace-only entries.
    ///
    /// `label` names the pool in events and errors (e.g. `"youtube"`).
    ///
    /// # Errors
    ///
    /// Returns [`RotatorError::EmptyPool`] when no usable key remains.
    pub fn new<I, S>(label: impl Into<String>, keys: I) -> Result<Self, RotatorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let label = label.into();
        let keys: Vec<String> = keys
            .into_iter()
            .map(Into::into)
            .filter(|key| !key.trim().is_empty())
            .collect();

        if keys.is_empty() {
            return Err(RotatorError::empty_pool(&label));
        }

        let distinct = keys.iter().collect::<HashSet<_>>().len();
        debug!(pool = %label, total = keys.len(), distinct, "creating key rotator");

        Ok(Self {
            label,
            keys,
            distinct,
            cooldown: DEFAULT_COOLDOWN,
            state: Mutex::new(RotationState {
                cursor: 0,
                failed: HashSet::new(),
                last_reset: Instant::now(),
            }),
            observer: Arc::new(TracingObserver),
        })
    }

    /// Creates a rotator from a comma-separated list such as an environment value.
    ///
    /// # Errors
    ///
    /// Returns [`RotatorError::EmptyPool`] when the list holds no usable key.
    pub fn from_comma_separated(label: impl Into<String>, raw: &str) -> Result<Self, RotatorError> {
        Self::new(label, raw.split(','))
    }

    /// Replaces the cooldown window.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Replaces the event observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RotationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the pool label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the configured cooldown window.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Returns a key to use for the next request.
    ///
    /// When every key has failed and the cooldown has elapsed since the last
    /// reset, the failed set is cleared first. The cursor then moves forward
    /// (wrapping) to the first key not marked failed. If every key is still
    /// failed, the key under the cursor is returned anyway.
    #[must_use]
    pub fn current_key(&self) -> String {
        let mut recovered = None;
        let key = {
            let mut state = self.lock_state();

            if state.failed.len() >= self.distinct {
                let now = Instant::now();
                if now.duration_since(state.last_reset) > self.cooldown {
                    recovered = Some(state.failed.len());
                    state.failed.clear();
                    state.last_reset = now;
                }
            }

            for _ in 0..self.keys.len() {
                if !state.failed.contains(&self.keys[state.cursor]) {
                    break;
                }
                state.cursor = (state.cursor + 1) % self.keys.len();
            }

            self.keys[state.cursor].clone()
        };

        if let Some(recovered) = recovered {
            self.notify(&RotationEvent::CooldownReset { recovered });
        }
        key
    }

    /// Marks `key` as failed and advances the cursor.
    ///
    /// Marking the same key twice does not change the failed count. Keys that
    /// are not part of the pool are not recorded, but the cursor still moves.
    #[instrument(skip_all, fields(pool = %self.label))]
    pub fn mark_failed(&self, key: &str) {
        let event = {
            let mut state = self.lock_state();
            if self.keys.iter().any(|candidate| candidate == key) {
                state.failed.insert(key.to_string());
            } else {
                debug!(key = %mask_key(key), "ignoring failure for key outside the pool");
            }
            state.cursor = (state.cursor + 1) % self.keys.len();

            RotationEvent::KeyFailed {
                key_hint: mask_key(key),
                cursor: state.cursor,
                failed: state.failed.len(),
                total: self.keys.len(),
            }
        };
        self.notify(&event);
    }

    /// Advances the cursor by one position regardless of failures.
    pub fn rotate(&self) {
        let cursor = {
            let mut state = self.lock_state();
            state.cursor = (state.cursor + 1) % self.keys.len();
            state.cursor
        };
        self.notify(&RotationEvent::Rotated { cursor });
    }

    /// Returns a snapshot of the pool size, failed count and cursor.
    #[must_use]
    pub fn stats(&self) -> RotationStats {
        let state = self.lock_state();
        RotationStats {
            total: self.keys.len(),
            failed: state.failed.len(),
            cursor: state.cursor,
            distinct: self.distinct,
        }
    }

    /// Clears every failure and restarts the cooldown clock.
    pub fn reset_failed(&self) {
        let recovered = {
            let mut state = self.lock_state();
            let recovered = state.failed.len();
            state.failed.clear();
            state.last_reset = Instant::now();
            recovered
        };
        self.notify(&RotationEvent::ManualReset { recovered });
    }

    fn notify(&self, event: &RotationEvent) {
        self.observer.on_event(&self.label, event);
    }

    // Every mutation leaves the state consistent, so a poisoned lock is still usable.
    fn lock_state(&self) -> MutexGuard<'_, RotationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for KeyRotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRotator")
            .field("label", &self.label)
            .field("total", &self.keys.len())
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}
