//! Best-match selection for (title, artist) search results.
//!
//! Search APIs return several loosely related hits for a query. The resolver
//! scores each candidate with a weighted, case-insensitive [`similarity`] of
//! its title and artist and keeps the best one if it clears
//! [`MATCH_THRESHOLD`].

use std::future::Future;

use tracing::{debug, instrument};

use crate::similarity::similarity;

/// Weight of the title similarity in the combined score.
pub const TITLE_WEIGHT: f64 = 0.6;

/// Weight of the artist similarity in the combined score.
pub const ARTIST_WEIGHT: f64 = 0.4;

/// A best match must score strictly above this value.
pub const MATCH_THRESHOLD: f64 = 0.5;

/// A search result that can be compared against a (title, artist) query.
pub trait MatchCandidate {
    /// The candidate's title.
    fn title(&self) -> &str;

    /// The candidate's artist, author or channel name.
    fn artist(&self) -> &str;
}

/// A candidate together with its match score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch<T> {
    /// The selected candidate.
    pub candidate: T,
    /// Combined score in `[0, 1]`.
    pub score: f64,
}

/// Scores one candidate against a query.
#[must_use]
pub fn score_candidate<T: MatchCandidate>(title: &str, artist: &str, candidate: &T) -> f64 {
    let title_score = similarity(&title.to_lowercase(), &candidate.title().to_lowercase());
    let artist_score = similarity(&artist.to_lowercase(), &candidate.artist().to_lowercase());
    TITLE_WEIGHT * title_score + ARTIST_WEIGHT * artist_score
}

/// Picks the highest-scoring candidate, if it clears [`MATCH_THRESHOLD`].
///
/// Equal scores keep the candidate that appeared first.
///
/// ```
/// use clowds_core::matching::{MatchCandidate, select_best_match};
///
/// struct Hit(&'static str, &'static str);
/// impl MatchCandidate for Hit {
///     fn title(&self) -> &str { self.0 }
///     fn artist(&self) -> &str { self.1 }
/// }
///
/// let hits = vec![Hit("Blinding Lights", "The Weeknd"), Hit("Save Your Tears", "The Weeknd")];
/// let best = select_best_match("blinding lights", "the weeknd", hits).unwrap();
/// assert_eq!(best.candidate.0, "Blinding Lights");
/// ```
#[must_use]
pub fn select_best_match<T, I>(title: &str, artist: &str, candidates: I) -> Option<ScoredMatch<T>>
where
    T: MatchCandidate,
    I: IntoIterator<Item = T>,
{
    let mut best: Option<ScoredMatch<T>> = None;
    for candidate in candidates {
        let score = score_candidate(title, artist, &candidate);
        let is_better = best.as_ref().is_none_or(|current| score > current.score);
        if is_better {
            best = Some(ScoredMatch { candidate, score });
        }
    }

    let best = best?;
    if best.score > MATCH_THRESHOLD {
        debug!(score = best.score, title = best.candidate.title(), "best match selected");
        Some(best)
    } else {
        debug!(score = best.score, "best candidate below match threshold");
        None
    }
}

/// Searches for `"{title} {artist}"` and returns the best match.
///
/// `search` is any async function from a query string to candidates, such as
/// a provider client's search method.
#[instrument(skip(search))]
pub async fn find_best_match<T, F, Fut>(
    title: &str,
    artist: &str,
    search: F,
) -> Option<ScoredMatch<T>>
where
    T: MatchCandidate,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Vec<T>>,
{
    let query = format!("{title} {artist}");
    let candidates = search(query).await;
    if candidates.is_empty() {
        debug!("search returned no candidates");
        return None;
    }
    select_best_match(title, artist, candidates)
}
