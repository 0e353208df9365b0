//! Genius API client: song search, song details and lyrics lookup.

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::{Fetched, fallback, send_json};
use crate::matching::{self, ScoredMatch};
use crate::models::{GeniusSong, LyricsData, LyricsSource};
use crate::request::{ExecuteError, RequestError, ResilientExecutor};

/// Default API root.
pub const DEFAULT_GENIUS_BASE_URL: &str = "https://api.genius.com";

const NOT_CONFIGURED: &str = "Genius API not configured";
const SEARCH_UNAVAILABLE: &str = "Genius search temporarily unavailable";
const SONG_UNAVAILABLE: &str = "Genius song temporarily unavailable";
const LYRICS_NOT_FOUND: &str = "Lyrics not found";

/// Genius lyrics state for songs with full lyrics.
const LYRICS_STATE_COMPLETE: &str = "complete";

/// Client for the lyrics platform.
///
/// Without an executor the client is "not configured": every call returns a
/// fallback without touching the network.
#[derive(Debug, Clone)]
pub struct GeniusClient {
    client: Client,
    base_url: String,
    executor: Option<ResilientExecutor>,
}

impl GeniusClient {
    /// Creates a client against [`DEFAULT_GENIUS_BASE_URL`].
    #[must_use]
    pub fn new(client: Client, executor: Option<ResilientExecutor>) -> Self {
        Self::with_base_url(client, executor, DEFAULT_GENIUS_BASE_URL)
    }

    /// Creates a client against a custom API root (used by tests).
    #[must_use]
    pub fn with_base_url(
        client: Client,
        executor: Option<ResilientExecutor>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            executor,
        }
    }

    /// Returns true when a credential pool is attached.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.executor.is_some()
    }

    /// Searches songs matching `query`.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Fetched<Vec<GeniusSong>> {
        let Some(executor) = &self.executor else {
            return fallback(Vec::new(), NOT_CONFIGURED);
        };

        let path = format!("search?q={}", urlencoding::encode(query));
        match self.get_json::<SearchEnvelope>(executor, &path).await {
            Ok(envelope) => {
                let songs: Vec<GeniusSong> = envelope
                    .response
                    .hits
                    .into_iter()
                    .map(|hit| hit.result.into_song(None))
                    .collect();
                debug!(count = songs.len(), "Genius search complete");
                Fetched::Live(songs)
            }
            Err(e) => {
                warn!(error = %e, "Genius search failed");
                fallback(Vec::new(), SEARCH_UNAVAILABLE)
            }
        }
    }

    /// Fetches one song with its plain-text description.
    #[instrument(skip(self))]
    pub async fn song(&self, song_id: u64) -> Fetched<Option<GeniusSong>> {
        let Some(executor) = &self.executor else {
            return fallback(None, NOT_CONFIGURED);
        };

        let path = format!("songs/{song_id}");
        match self.get_json::<SongEnvelope>(executor, &path).await {
            Ok(envelope) => {
                let song = envelope.response.song;
                let description = song
                    .description
                    .as_ref()
                    .and_then(|d| d.plain.clone())
                    .filter(|d| !d.is_empty());
                Fetched::Live(Some(song.result.into_song(description)))
            }
            Err(e) => {
                warn!(error = %e, "Genius song fetch failed");
                fallback(None, SONG_UNAVAILABLE)
            }
        }
    }

    /// Searches for `"{title} {artist}"` and returns the best-scoring song.
    ///
    /// A failed search yields no match.
    #[instrument(skip(self))]
    pub async fn find_best_match(&self, title: &str, artist: &str) -> Option<ScoredMatch<GeniusSong>> {
        matching::find_best_match(title, artist, |query| async move {
            self.search(&query).await.into_value()
        })
        .await
    }

    /// Looks up lyrics for a track.
    ///
    /// Returns a placeholder body that points at the song page; the page
    /// itself is not scraped.
    #[instrument(skip(self))]
    pub async fn lyrics(&self, title: &str, artist: &str) -> Fetched<Option<LyricsData>> {
        if !self.is_configured() {
            return fallback(None, NOT_CONFIGURED);
        }

        let Some(best) = self.find_best_match(title, artist).await else {
            return fallback(None, LYRICS_NOT_FOUND);
        };
        if !best.candidate.has_lyrics {
            debug!(song_id = best.candidate.id, "best match has no lyrics");
            return fallback(None, LYRICS_NOT_FOUND);
        }

        debug!(song_id = best.candidate.id, score = best.score, "lyrics match found");
        Fetched::Live(Some(LyricsData {
            lyrics: format!(
                "Lyrics are available on Genius.com\n\nView full lyrics: {}",
                best.candidate.url
            ),
            source: LyricsSource::Genius,
            is_timestamped: false,
        }))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        executor: &ResilientExecutor,
        path_and_query: &str,
    ) -> Result<T, ExecuteError<RequestError>> {
        let url = format!("{}/{path_and_query}", self.base_url);
        executor
            .execute(|key| {
                let request = self.client.get(&url).bearer_auth(key);
                let url = url.clone();
                async move { send_json(request, &url).await }
            })
            .await
    }
}

// ==== Response shapes ====

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    result: SongResult,
}

#[derive(Debug, Deserialize)]
struct SongEnvelope {
    response: SongBody,
}

#[derive(Debug, Deserialize)]
struct SongBody {
    song: SongWithDescription,
}

#[derive(Debug, Deserialize)]
struct SongWithDescription {
    #[serde(flatten)]
    result: SongResult,
    description: Option<Description>,
}

#[derive(Debug, Deserialize)]
struct Description {
    plain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SongResult {
    id: u64,
    title: String,
    primary_artist: PrimaryArtist,
    url: String,
    song_art_image_url: Option<String>,
    #[serde(default)]
    lyrics_state: String,
}

#[derive(Debug, Deserialize)]
struct PrimaryArtist {
    name: String,
}

impl SongResult {
    fn into_song(self, description: Option<String>) -> GeniusSong {
        GeniusSong {
            id: self.id,
            title: self.title,
            artist: self.primary_artist.name,
            url: self.url,
            artwork: self.song_art_image_url,
            has_lyrics: self.lyrics_state == LYRICS_STATE_COMPLETE,
            description,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unconfigured() -> GeniusClient {
        GeniusClient::new(Client::new(), None)
    }

    #[tokio::test]
    async fn test_unconfigured_search_falls_back() {
        let result = unconfigured().search("anything").await;
        assert_eq!(result.message(), Some("Genius API not configured"));
        assert!(result.into_value().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_song_and_lyrics_fall_back() {
        let client = unconfigured();
        assert!(!client.is_configured());

        let song = client.song(42).await;
        assert_eq!(song.message(), Some("Genius API not configured"));
        assert!(song.into_value().is_none());

        let lyrics = client.lyrics("Hello", "Adele").await;
        assert_eq!(lyrics.message(), Some("Genius API not configured"));
        assert!(lyrics.into_value().is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_find_best_match_is_none() {
        assert!(unconfigured().find_best_match("Hello", "Adele").await.is_none());
    }

    #[test]
    fn test_search_hit_mapping() {
        let envelope: SearchEnvelope = serde_json::from_value(serde_json::json!({
            "response": {
                "hits": [{
                    "result": {
                        "id": 378195,
                        "title": "Hello",
                        "primary_artist": { "name": "Adele" },
                        "url": "https://genius.com/Adele-hello-lyrics",
                        "song_art_image_url": "https://images.genius.com/hello.jpg",
                        "lyrics_state": "complete"
                    }
                }, {
                    "result": {
                        "id": 1,
                        "title": "Hello (Demo)",
                        "primary_artist": { "name": "Adele" },
                        "url": "https://genius.com/demo",
                        "lyrics_state": "unreleased"
                    }
                }]
            }
        }))
        .unwrap();

        let songs: Vec<GeniusSong> = envelope
            .response
            .hits
            .into_iter()
            .map(|hit| hit.result.into_song(None))
            .collect();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].artist, "Adele");
        assert!(songs[0].has_lyrics);
        assert_eq!(
            songs[0].artwork.as_deref(),
            Some("https://images.genius.com/hello.jpg")
        );
        assert!(!songs[1].has_lyrics);
        assert!(songs[1].artwork.is_none());
    }

    #[test]
    fn test_song_envelope_reads_plain_description() {
        let envelope: SongEnvelope = serde_json::from_value(serde_json::json!({
            "response": {
                "song": {
                    "id": 7,
                    "title": "Song",
                    "primary_artist": { "name": "Artist" },
                    "url": "https://genius.com/song",
                    "lyrics_state": "complete",
                    "description": { "plain": "About the song" }
                }
            }
        }))
        .unwrap();
        let song = envelope.response.song;
        assert_eq!(
            song.description.and_then(|d| d.plain).as_deref(),
            Some("About the song")
        );
        assert_eq!(song.result.id, 7);
    }
}
