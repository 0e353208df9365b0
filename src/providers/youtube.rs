//! YouTube Data API v3 client.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{Fetched, fallback, send_json};
use crate::models::{Track, TrackSource};
use crate::request::{ExecuteError, RequestError, ResilientExecutor};

/// Default API root.
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Default page size for search and trending.
pub const DEFAULT_MAX_RESULTS: u32 = 25;

/// Video category id for Music.
const MUSIC_CATEGORY_ID: &str = "10";

const NOT_CONFIGURED: &str = "YouTube API not configured";
const SEARCH_UNAVAILABLE: &str = "YouTube search temporarily unavailable";
const TRENDING_UNAVAILABLE: &str = "YouTube trending temporarily unavailable";
const DETAILS_UNAVAILABLE: &str = "YouTube video details temporarily unavailable";
const VIDEO_UNAVAILABLE: &str = "YouTube video temporarily unavailable";

#[allow(clippy::expect_used)]
static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static VIDEO_ID_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)")
            .expect("video id regex is valid"),
        Regex::new(r"youtube\.com/v/([^&\n?#]+)").expect("video id regex is valid"),
    ]
});

/// Client for video search, details and trending.
///
/// Every request goes through the shared [`ResilientExecutor`], so a 400 or
/// 403 from the API rotates to the next key in the pool. Without an executor
/// every call returns the "not configured" fallback and makes no request.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    executor: Option<ResilientExecutor>,
}

impl YouTubeClient {
    /// Creates a client against [`DEFAULT_YOUTUBE_BASE_URL`].
    #[must_use]
    pub fn new(client: Client, executor: Option<ResilientExecutor>) -> Self {
        Self::with_base_url(client, executor, DEFAULT_YOUTUBE_BASE_URL)
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

    /// Whether any API keys were supplied.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.executor.is_some()
    }

    /// Returns the executor shared by all requests, if configured.
    #[must_use]
    pub fn executor(&self) -> Option<&ResilientExecutor> {
        self.executor.as_ref()
    }

    /// Searches for videos matching `query`, with durations filled in.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, max_results: u32) -> Fetched<Vec<Track>> {
        let Some(executor) = &self.executor else {
            return fallback(Vec::new(), NOT_CONFIGURED);
        };
        let path = format!(
            "search?part=snippet&type=video&q={}&maxResults={max_results}",
            urlencoding::encode(query)
        );
        let response: SearchResponse = match self.get_json(executor, &path).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "YouTube search failed");
                return fallback(Vec::new(), SEARCH_UNAVAILABLE);
            }
        };

        let hits: Vec<(String, Snippet)> = response
            .items
            .into_iter()
            .filter_map(|item| Some((item.id.video_id?, item.snippet.unwrap_or_default())))
            .collect();

        let ids: Vec<String> = hits.iter().map(|(id, _)| id.clone()).collect();
        let durations = self.video_details(&ids).await.into_value();

        let tracks = hits
            .into_iter()
            .map(|(id, snippet)| {
                let duration = durations.get(&id).copied().unwrap_or(0);
                build_track(id, snippet, duration)
            })
            .collect::<Vec<_>>();
        debug!(count = tracks.len(), "YouTube search complete");
        Fetched::Live(tracks)
    }

    /// Looks up durations in seconds for `ids`.
    ///
    /// Ids the API does not return are absent from the map. On failure every
    /// requested id maps to zero.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn video_details(&self, ids: &[String]) -> Fetched<HashMap<String, u64>> {
        if ids.is_empty() {
            return Fetched::Live(HashMap::new());
        }
        let Some(executor) = &self.executor else {
            return fallback(zero_durations(ids), NOT_CONFIGURED);
        };

        let path = format!(
            "videos?part=contentDetails&id={}",
            urlencoding::encode(&ids.join(","))
        );
        match self.get_json::<VideosResponse>(executor, &path).await {
            Ok(response) => Fetched::Live(
                response
                    .items
                    .into_iter()
                    .map(|item| {
                        let duration = item
                            .content_details
                            .map_or(0, |details| parse_duration(&details.duration));
                        (item.id, duration)
                    })
                    .collect(),
            ),
            Err(e) => {
                warn!(error = %e, "YouTube video details failed");
                fallback(zero_durations(ids), DETAILS_UNAVAILABLE)
            }
        }
    }

    /// Fetches one video by id. `Live(None)` means the video does not exist.
    #[instrument(skip(self))]
    pub async fn video_by_id(&self, video_id: &str) -> Fetched<Option<Track>> {
        let Some(executor) = &self.executor else {
            return fallback(None, NOT_CONFIGURED);
        };
        let path = format!(
            "videos?part=snippet,contentDetails&id={}",
            urlencoding::encode(video_id)
        );
        match self.get_json::<VideosResponse>(executor, &path).await {
            Ok(response) => Fetched::Live(response.items.into_iter().next().map(video_to_track)),
            Err(e) => {
                warn!(error = %e, "YouTube video fetch failed");
                fallback(None, VIDEO_UNAVAILABLE)
            }
        }
    }

    /// Fetches the most popular music videos.
    #[instrument(skip(self))]
    pub async fn trending(&self, max_results: u32) -> Fetched<Vec<Track>> {
        let Some(executor) = &self.executor else {
            return fallback(Vec::new(), NOT_CONFIGURED);
        };
        let path = format!(
            "videos?part=snippet,contentDetails&chart=mostPopular&videoCategoryId={MUSIC_CATEGORY_ID}&maxResults={max_results}"
        );
        match self.get_json::<VideosResponse>(executor, &path).await {
            Ok(response) => {
                Fetched::Live(response.items.into_iter().map(video_to_track).collect())
            }
            Err(e) => {
                warn!(error = %e, "YouTube trending failed");
                fallback(Vec::new(), TRENDING_UNAVAILABLE)
            }
        }
    }

    /// Runs a GET for `path_and_query` through the executor.
    ///
    /// The key is appended per attempt and kept out of the URL used in errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        executor: &ResilientExecutor,
        path_and_query: &str,
    ) -> Result<T, ExecuteError<RequestError>> {
        let display_url = format!("{}/{path_and_query}", self.base_url);
        executor
            .execute(|key| {
                let url = format!("{display_url}&key={}", urlencoding::encode(&key));
                let request = self.client.get(url);
                let display_url = display_url.clone();
                async move { send_json(request, &display_url).await }
            })
            .await
    }
}

fn zero_durations(ids: &[String]) -> HashMap<String, u64> {
    ids.iter().map(|id| (id.clone(), 0)).collect()
}

/// Converts an ISO-8601 duration such as `PT4M13S` to seconds.
///
/// Returns 0 when the string has no `PT` component.
#[must_use]
pub fn parse_duration(iso: &str) -> u64 {
    let Some(caps) = DURATION_PATTERN.captures(iso) else {
        return 0;
    };
    let part = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    part(1)
        .saturating_mul(3600)
        .saturating_add(part(2).saturating_mul(60))
        .saturating_add(part(3))
}

/// Extracts the video id from a watch, short, embed or legacy `/v/` URL.
#[must_use]
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if let Some(id) = Url::parse(input).ok().and_then(|url| video_id_from_url(&url)) {
        return Some(id);
    }

    VIDEO_ID_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

fn video_id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.trim_start_matches("www.");
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let id = match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "m.youtube.com" | "music.youtube.com" => match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(name, _)| name == "v")
                .map(|(_, value)| value.into_owned()),
            "embed" | "v" => segments.next().map(str::to_string),
            _ => None,
        },
        _ => None,
    };
    id.filter(|id| !id.is_empty())
}

fn video_to_track(item: VideoItem) -> Track {
    let duration = item
        .content_details
        .map_or(0, |details| parse_duration(&details.duration));
    build_track(item.id, item.snippet.unwrap_or_default(), duration)
}

fn build_track(id: String, snippet: Snippet, duration: u64) -> Track {
    let thumbnail = snippet
        .thumbnails
        .medium
        .or(snippet.thumbnails.default)
        .map(|thumb| thumb.url);
    Track {
        url: Some(format!("https://www.youtube.com/watch?v={id}")),
        id,
        title: snippet.title,
        artist: snippet.channel_title,
        album: None,
        duration,
        thumbnail,
        source: TrackSource::Youtube,
    }
}

// ==== Response shapes ====

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Option<Snippet>,
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Snippet {
    title: String,
    channel_title: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thumbnails {
    default: Option<Thumbnail>,
    medium: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}
