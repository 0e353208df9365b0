//! Clowds Core Library
//!
//! Request resilience for the clowds music client: rotating API key pools,
//! bounded retry over credential failures, and fuzzy title/artist matching
//! against provider search results.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`rotation`] - Key pools with failure tracking and timed cooldown
//! - [`request`] - Resilient executor that retries a credentialed operation
//! - [`similarity`] - Jaro-Winkler string similarity
//! - [`matching`] - Weighted best-match selection over search results
//! - [`providers`] - YouTube and Genius clients with fallback responses
//! - [`config`] - Credential and settings loading
//! - [`context`] - Provider wiring from settings and credentials

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod http_client;
pub mod matching;
pub mod models;
pub mod providers;
pub mod request;
pub mod rotation;
pub mod similarity;
mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, Credentials, FileSettings, Settings};
pub use context::{Services, ServicesError};
pub use matching::{MatchCandidate, ScoredMatch, find_best_match, select_best_match};
pub use models::{GeniusSong, LyricsData, LyricsSource, Track, TrackSource};
pub use providers::{Fetched, GeniusClient, LyricsChain, LyricsProvider, YouTubeClient};
pub use request::{
    ClassifyFailure, ExecuteError, FailureKind, RequestError, ResilientExecutor, RetryPolicy,
};
pub use rotation::{KeyRotator, RotationEvent, RotationObserver, RotationStats, RotatorError};
pub use similarity::similarity;
