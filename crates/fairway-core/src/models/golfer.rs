//! Golfer ranking snapshot.

use serde::{Deserialize, Serialize};

/// A golfer's position in the world ranking at the time of the last refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GolferRanking {
    /// Identifier within the source that produced this record.
    pub id: String,
    /// Display name ("First Last").
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// World rank, 1 is best.
    pub world_rank: u32,
    /// Skill rating on a 0-100 scale.
    pub skill_rating: Option<f64>,
    /// Recent form rating on a 0-100 scale.
    pub form_rating: Option<f64>,
    pub country: Option<String>,
    /// Identifier of the golfer in the upstream third-party source.
    pub external_id: Option<String>,
}

impl GolferRanking {
    /// Creates a ranking entry with only the required fields set.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, world_rank: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            first_name: None,
            last_name: None,
            world_rank,
            skill_rating: None,
            form_rating: None,
            country: None,
            external_id: None,
        }
    }

    /// Returns true if `id` names this golfer either locally or upstream.
    #[must_use]
    pub fn has_id(&self, id: &str) -> bool {
        self.id == id || self.external_id.as_deref() == Some(id)
    }
}

/// Sorts rankings by world rank ascending and keeps the first `limit`.
pub fn top_ranked(mut rankings: Vec<GolferRanking>, limit: usize) -> Vec<GolferRanking> {
    rankings.sort_by_key(|r| r.world_rank);
    rankings.truncate(limit);
    rankings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_ranked_sorts_and_truncates() {
        let rankings = vec![
            GolferRanking::new("3", "Rory McIlroy", 3),
            GolferRanking::new("1", "Scottie Scheffler", 1),
            GolferRanking::new("2", "Xander Schauffele", 2),
        ];

        let top = top_ranked(rankings, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].world_rank, 1);
        assert_eq!(top[1].world_rank, 2);
    }

    #[test]
    fn test_has_id_matches_external_id() {
        let mut golfer = GolferRanking::new("42", "Jon Rahm", 7);
        golfer.external_id = Some("dg-19195".to_string());
        assert!(golfer.has_id("42"));
        assert!(golfer.has_id("dg-19195"));
        assert!(!golfer.has_id("7"));
    }
}
