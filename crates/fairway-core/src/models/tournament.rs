//! Tournament schedule entries.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tournament lifecycle status.
///
/// Always derived from the current date against the start and end dates,
/// never copied from an upstream status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Upcoming,
    InProgress,
    Completed,
}

impl TournamentStatus {
    /// Derives the status of an event spanning `start..=end` on `today`.
    #[must_use]
    pub fn derive(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Self {
        if today < start {
            Self::Upcoming
        } else if today > end {
            Self::Completed
        } else {
            Self::InProgress
        }
    }

    /// Returns the wire name of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheduled tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub course: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: TournamentStatus,
    /// Purse in whole US dollars.
    pub purse: Option<u64>,
    pub external_id: Option<String>,
}

/// Optional narrowing applied to `get_tournaments`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TournamentFilter {
    pub status: Option<TournamentStatus>,
    /// Calendar year the tournament starts in.
    pub season: Option<i32>,
    pub limit: Option<usize>,
}

impl TournamentFilter {
    /// Filter for a single status.
    #[must_use]
    pub fn with_status(status: TournamentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Returns true if the tournament passes the status and season filters.
    #[must_use]
    pub fn matches(&self, tournament: &Tournament) -> bool {
        self.status.map_or(true, |s| s == tournament.status)
            && self.season.map_or(true, |y| y == tournament.start_date.year())
    }

    /// Filters, orders by start date, and applies the limit.
    #[must_use]
    pub fn apply(&self, tournaments: Vec<Tournament>) -> Vec<Tournament> {
        let mut selected: Vec<Tournament> =
            tournaments.into_iter().filter(|t| self.matches(t)).collect();
        selected.sort_by_key(|t| t.start_date);
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}
