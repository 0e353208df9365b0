//! Value records handed to the presentation layer.
//!
//! These are plain data; the library fills them from provider responses and
//! never interprets them beyond title/artist matching.

use serde::{Deserialize, Serialize};

use crate::matching::MatchCandidate;

/// Where a track can be played from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackSource {
    /// Streamed from a YouTube video.
    Youtube,
    /// Streamed from SoundCloud.
    Soundcloud,
    /// A file on the user's device.
    Local,
}

/// A playable track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Provider-specific id, such as a YouTube video id.
    pub id: String,
    pub title: String,
    /// Artist or uploading channel name.
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Length in seconds; 0 when unknown.
    pub duration: u64,
    /// Cover or thumbnail image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Playback page URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub source: TrackSource,
}

impl MatchCandidate for Track {
    fn title(&self) -> &str {
        &self.title
    }

    fn artist(&self) -> &str {
        &self.artist
    }
}

/// A song entry from the lyrics platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeniusSong {
    /// Numeric Genius song id.
    pub id: u64,
    pub title: String,
    /// Primary artist name.
    pub artist: String,
    /// Song page URL.
    pub url: String,
    /// Song art image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
    /// True when the platform marks the lyrics as complete.
    pub has_lyrics: bool,
    /// Plain-text description; only filled by a single-song lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MatchCandidate for GeniusSong {
    fn title(&self) -> &str {
        &self.title
    }

    fn artist(&self) -> &str {
        &self.artist
    }
}

/// Where lyrics text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LyricsSource {
    /// Resolved through the Genius API.
    Genius,
    /// Generated locally without a network call.
    Local,
}

/// Lyrics text for a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsData {
    /// Lyrics body, or a placeholder message.
    pub lyrics: String,
    pub source: LyricsSource,
    /// True for synced lyrics with per-line timestamps.
    pub is_timestamped: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_track_serializes_camel_case() {
        let track = Track {
            id: "abc".to_string(),
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            album: None,
            duration: 253,
            thumbnail: Some("https://i.ytimg.com/vi/abc/mqdefault.jpg".to_string()),
            url: None,
            source: TrackSource::Youtube,
        };
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["source"], "youtube");
        assert_eq!(json["duration"], 253);
        assert!(json.get("album").is_none());
        assert!(json.get("thumbnail").is_some());
    }

    #[test]
    fn test_lyrics_data_field_names() {
        let lyrics = LyricsData {
            lyrics: "la la".to_string(),
            source: LyricsSource::Local,
            is_timestamped: false,
        };
        let json = serde_json::to_value(&lyrics).unwrap();
        assert_eq!(json["isTimestamped"], false);
        assert_eq!(json["source"], "local");
    }
}
