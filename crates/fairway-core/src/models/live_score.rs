//! Live leaderboard entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Leaderboard position: a numeric place or a placement marker such as `CUT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Place { rank: u32, tied: bool },
    Marker(String),
}

impl Position {
    /// Parses the textual forms used by leaderboards: `5`, `T5`, `CUT`, `WD`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (tied, digits) = match trimmed.strip_prefix(['T', 't']) {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        match digits.parse::<u32>() {
            Ok(rank) => Self::Place { rank, tied },
            Err(_) => Self::Marker(trimmed.to_uppercase()),
        }
    }

    /// Numeric rank, if the golfer holds one.
    #[must_use]
    pub const fn rank(&self) -> Option<u32> {
        match self {
            Self::Place { rank, .. } => Some(*rank),
            Self::Marker(_) => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Place { rank, tied: true } => write!(f, "T{}", rank),
            Self::Place { rank, tied: false } => write!(f, "{}", rank),
            Self::Marker(marker) => write!(f, "{}", marker),
        }
    }
}

/// How far through the current round a golfer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Thru {
    Holes(u8),
    Finished,
}

impl Thru {
    /// Parses `F`, `18`, `9`, `9*` style markers. Unknown markers read as
    /// not started.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim().trim_end_matches('*');
        if trimmed.eq_ignore_ascii_case("f") {
            return Self::Finished;
        }
        Self::Holes(trimmed.parse().unwrap_or(0))
    }
}

impl fmt::Display for Thru {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Holes(holes) => write!(f, "{}", holes),
            Self::Finished => write!(f, "F"),
        }
    }
}

/// One golfer's standing in one tournament for one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveScore {
    pub tournament_id: String,
    pub tournament_name: String,
    pub golfer_id: String,
    pub golfer_name: String,
    pub position: Position,
    /// Total relative to par.
    pub total_score: i32,
    pub thru: Thru,
    /// Today's round relative to par.
    pub today: Option<i32>,
    /// Stroke totals per completed round, in round order.
    pub rounds: Vec<u32>,
    pub updated_at: DateTime<Utc>,
}
