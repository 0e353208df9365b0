//! Lyrics sources and the ordered provider chain.

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{Fetched, GeniusClient, fallback};
use crate::models::{LyricsData, LyricsSource};

const NO_PROVIDER_FOUND: &str = "Lyrics not found";

/// A source of lyrics for a title/artist pair.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Looks up lyrics. `Live(Some(_))` is a hit; anything else lets the
    /// chain move on.
    async fn lookup(&self, title: &str, artist: &str) -> Fetched<Option<LyricsData>>;
}

#[async_trait]
impl LyricsProvider for GeniusClient {
    fn name(&self) -> &str {
        "genius"
    }

    async fn lookup(&self, title: &str, artist: &str) -> Fetched<Option<LyricsData>> {
        self.lyrics(title, artist).await
    }
}

/// Local source that always answers with an "unavailable" notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderLyrics;

#[async_trait]
impl LyricsProvider for PlaceholderLyrics {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn lookup(&self, title: &str, artist: &str) -> Fetched<Option<LyricsData>> {
        Fetched::Live(Some(LyricsData {
            lyrics: format!(
                "Looking for lyrics for \"{title}\" by {artist}...\n\nLyrics service temporarily unavailable."
            ),
            source: LyricsSource::Local,
            is_timestamped: false,
        }))
    }
}

/// Lyrics providers tried in registration order.
#[derive(Default)]
pub struct LyricsChain {
    providers: Vec<Box<dyn LyricsProvider>>,
}

impl LyricsChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider to the end of the chain.
    pub fn register(&mut self, provider: Box<dyn LyricsProvider>) {
        debug!(name = provider.name(), "Registering lyrics provider");
        self.providers.push(provider);
    }

    /// Builder-style [`LyricsChain::register`].
    #[must_use]
    pub fn with(mut self, provider: impl LyricsProvider + 'static) -> Self {
        self.register(Box::new(provider));
        self
    }

    /// Returns the number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns true if no providers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Returns the first live hit, or a fallback carrying the last
    /// provider's message.
    #[instrument(skip(self), fields(providers = self.providers.len()))]
    pub async fn lookup(&self, title: &str, artist: &str) -> Fetched<Option<LyricsData>> {
        let mut last_message = None;
        for provider in &self.providers {
            match provider.lookup(title, artist).await {
                Fetched::Live(Some(lyrics)) => {
                    debug!(provider = provider.name(), "lyrics found");
                    return Fetched::Live(Some(lyrics));
                }
                Fetched::Live(None) => {
                    debug!(provider = provider.name(), "provider had no lyrics");
                }
                Fetched::Fallback { message, .. } => {
                    debug!(provider = provider.name(), %message, "provider fell back");
                    last_message = Some(message);
                }
            }
        }
        fallback(None, last_message.unwrap_or_else(|| NO_PROVIDER_FOUND.to_string()))
    }
}

impl std::fmt::Debug for LyricsChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("LyricsChain").field("providers", &names).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Missing {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LyricsProvider for Missing {
        fn name(&self) -> &str {
            "missing"
        }

        async fn lookup(&self, _title: &str, _artist: &str) -> Fetched<Option<LyricsData>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Fetched::Fallback {
                value: None,
                message: "not here".to_string(),
            }
        }
    }

    #[tokio::test]
    async fn test_placeholder_body_and_source() {
        let result = PlaceholderLyrics.lookup("Hello", "Adele").await;
        let lyrics = result.into_value().unwrap();
        assert_eq!(lyrics.source, LyricsSource::Local);
        assert!(!lyrics.is_timestamped);
        assert!(lyrics.lyrics.starts_with("Looking for lyrics for \"Hello\" by Adele..."));
        assert!(lyrics.lyrics.ends_with("Lyrics service temporarily unavailable."));
    }

    #[tokio::test]
    async fn test_chain_falls_through_to_next_provider() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = LyricsChain::new()
            .with(Missing {
                calls: Arc::clone(&calls),
            })
            .with(PlaceholderLyrics);

        let result = chain.lookup("Hello", "Adele").await;
        assert!(!result.is_fallback());
        assert_eq!(result.into_value().unwrap().source, LyricsSource::Local);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_hit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = LyricsChain::new().with(PlaceholderLyrics).with(Missing {
            calls: Arc::clone(&calls),
        });

        assert!(chain.lookup("a", "b").await.value().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chain_all_missing_reports_last_message() {
        let chain = LyricsChain::new().with(Missing {
            calls: Arc::new(AtomicUsize::new(0)),
        });
        let result = chain.lookup("a", "b").await;
        assert_eq!(result.message(), Some("not here"));
        assert!(result.into_value().is_none());
    }

    #[tokio::test]
    async fn test_empty_chain_falls_back() {
        let chain = LyricsChain::new();
        assert!(chain.is_empty());
        let result = chain.lookup("a", "b").await;
        assert_eq!(result.message(), Some("Lyrics not found"));
    }

    #[test]
    fn test_debug_lists_provider_names() {
        let chain = LyricsChain::new().with(PlaceholderLyrics);
        assert_eq!(chain.len(), 1);
        assert!(format!("{chain:?}").contains("placeholder"));
    }
}
