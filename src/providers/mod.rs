//! Provider clients for the video and lyrics platforms.
//!
//! Every public provider call returns a [`Fetched`] value instead of a
//! `Result`: on any failure the caller receives an explicit default plus a
//! message describing why live data is missing.
//!
//! # Architecture
//!
//! - [`YouTubeClient`] - video search, details and trending via a rotating key pool
//! - [`GeniusClient`] - song search, song details and best-match lyrics lookup
//! - [`LyricsProvider`] - async trait for lyrics sources
//! - [`LyricsChain`] - ordered lyrics providers with first-live-result wins
//! - [`PlaceholderLyrics`] - local "unavailable" lyrics source

mod genius;
mod lyrics;
mod youtube;

pub use genius::{DEFAULT_GENIUS_BASE_URL, GeniusClient};
pub use lyrics::{LyricsChain, LyricsProvider, PlaceholderLyrics};
pub use youtube::{
    DEFAULT_MAX_RESULTS, DEFAULT_YOUTUBE_BASE_URL, YouTubeClient, extract_video_id,
    parse_duration,
};

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::request::RequestError;

/// A provider result: live data, or a caller-chosen default with a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// Data returned by the service.
    Live(T),
    /// The service could not be used; `value` is the fallback.
    Fallback {
        /// The default value supplied by the caller.
        value: T,
        /// Why live data is unavailable.
        message: String,
    },
}

impl<T> Fetched<T> {
    /// Returns the contained value, live or fallback.
    pub fn into_value(self) -> T {
        match self {
            Self::Live(value) | Self::Fallback { value, .. } => value,
        }
    }

    /// Borrows the contained value.
    pub fn value(&self) -> &T {
        match self {
            Self::Live(value) | Self::Fallback { value, .. } => value,
        }
    }

    /// Returns true for fallback values.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Returns the fallback message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Live(_) => None,
            Self::Fallback { message, .. } => Some(message),
        }
    }

    /// Maps the contained value, keeping the fallback message.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Live(value) => Fetched::Live(f(value)),
            Self::Fallback { value, message } => Fetched::Fallback {
                value: f(value),
                message,
            },
        }
    }
}

/// Wraps `value` as a fallback response and logs `message`.
pub fn fallback<T>(value: T, message: impl Into<String>) -> Fetched<T> {
    let message = message.into();
    warn!(%message, "Using fallback response");
    Fetched::Fallback { value, message }
}

/// Sends `request` and decodes a JSON body.
///
/// `display_url` is used in errors and must not contain credentials.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    display_url: &str,
) -> Result<T, RequestError> {
    let response = request
        .send()
        .await
        .map_err(|e| RequestError::from_send(display_url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RequestError::http_status(display_url, status.as_u16()));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| RequestError::decode(display_url, e))
}
