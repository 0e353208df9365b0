//! Provider wiring built once at startup.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Credentials, Settings};
use crate::http_client::build_http_client;
use crate::providers::{GeniusClient, LyricsChain, PlaceholderLyrics, YouTubeClient};
use crate::request::ResilientExecutor;
use crate::rotation::{KeyRotator, RotatorError};

/// Errors building [`Services`].
#[derive(Debug, Error)]
pub enum ServicesError {
    /// A supplied credential pool held no usable keys.
    #[error(transparent)]
    Rotator(#[from] RotatorError),

    /// The HTTP client could not be initialized.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Provider clients sharing one HTTP client, one rotator per pool.
#[derive(Debug)]
pub struct Services {
    /// Video platform client; unconfigured when no YouTube keys are set.
    pub youtube: YouTubeClient,
    /// Lyrics platform client; unconfigured when no Genius tokens are set.
    pub genius: GeniusClient,
    /// Genius first, then the local placeholder.
    pub lyrics: LyricsChain,
}

impl Services {
    /// Builds every provider from `settings` and `credentials`.
    ///
    /// An empty credential pool leaves that provider unconfigured; its calls
    /// return the "not configured" fallback.
    ///
    /// # Errors
    ///
    /// Returns [`ServicesError::HttpClient`] when the HTTP client cannot be
    /// built and [`ServicesError::Rotator`] when a non-empty pool holds only
    /// blank keys.
    pub fn build(settings: &Settings, credentials: &Credentials) -> Result<Self, ServicesError> {
        let client = build_http_client(settings.timeouts)?;

        let youtube_executor = pool_executor("youtube", &credentials.youtube, settings)?;
        if youtube_executor.is_none() {
            info!("No YouTube keys configured, video lookups will fall back");
        }
        let youtube = YouTubeClient::with_base_url(
            client.clone(),
            youtube_executor,
            settings.youtube_base_url.as_str(),
        );

        let genius_executor = pool_executor("genius", &credentials.genius, settings)?;
        if genius_executor.is_none() {
            info!("No Genius tokens configured, lyrics lookups will fall back");
        }
        let genius = GeniusClient::with_base_url(
            client,
            genius_executor,
            settings.genius_base_url.as_str(),
        );

        let lyrics = LyricsChain::new()
            .with(genius.clone())
            .with(PlaceholderLyrics);

        debug!(
            youtube_keys = credentials.youtube.len(),
            youtube_configured = youtube.is_configured(),
            genius_configured = genius.is_configured(),
            "services ready"
        );
        Ok(Self {
            youtube,
            genius,
            lyrics,
        })
    }
}

fn pool_executor(
    provider: &str,
    keys: &[String],
    settings: &Settings,
) -> Result<Option<ResilientExecutor>, RotatorError> {
    if keys.is_empty() {
        return Ok(None);
    }
    let rotator = Arc::new(
        KeyRotator::new(provider, keys.iter().cloned())?.with_cooldown(settings.cooldown),
    );
    Ok(Some(ResilientExecutor::with_policy(
        rotator,
        settings.retry.clone(),
    )))
}
