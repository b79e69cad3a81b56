//! Cache key generators for consistent key naming.
//!
//! Keys are relative; [`TieredCacheStore`](crate::TieredCacheStore) prefixes
//! them with its namespace.

use chrono::NaiveDate;
use fairway_core::TournamentFilter;

/// Segment for rankings entries.
pub const RANKINGS: &str = "rankings";
/// Segment for live-score entries.
pub const LIVE_SCORES: &str = "live_scores";
/// Segment for tournament schedule entries.
pub const TOURNAMENTS: &str = "tournaments";
/// Segment for single-golfer entries.
pub const GOLFER: &str = "golfer";

/// Rankings for `date` truncated to `limit`.
///
/// Scoping by date means a new day never reads the previous day's list.
#[must_use]
pub fn rankings(date: NaiveDate, limit: usize) -> String {
    format!("{}:{}:{}", RANKINGS, date.format("%Y-%m-%d"), limit)
}

/// Live scores for one tournament, or the current event when `None`.
#[must_use]
pub fn live_scores(tournament_id: Option<&str>) -> String {
    format!("{}:{}", LIVE_SCORES, tournament_id.unwrap_or("current"))
}

/// Tournament schedule for a filter.
#[must_use]
pub fn tournaments(filter: &TournamentFilter) -> String {
    let status = filter.status.map_or("any", |s| s.as_str());
    let season = filter
        .season
        .map_or_else(|| "any".to_string(), |s| s.to_string());
    let limit = filter
        .limit
        .map_or_else(|| "all".to_string(), |l| l.to_string());
    format!("{}:{}:{}:{}", TOURNAMENTS, status, season, limit)
}

/// A single golfer by ID.
#[must_use]
pub fn golfer(id: &str) -> String {
    format!("{}:{}", GOLFER, id)
}
