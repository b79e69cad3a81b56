//! Third-party payloads and their translation into the data model.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use fairway_core::{GolferRanking, LiveScore, Position, Thru, Tournament, TournamentStatus};
use serde::Deserialize;

/// Rankings response.
#[derive(Debug, Deserialize)]
pub struct RankingsResponse {
    #[serde(default)]
    pub last_updated: Option<String>,
    pub rankings: Vec<RankingEntry>,
}

/// One ranked player in the source schema.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingEntry {
    pub dg_id: u64,
    /// "Last, First".
    pub player_name: String,
    #[serde(default)]
    pub country: Option<String>,
    /// Source's own model rank.
    #[serde(default)]
    pub datagolf_rank: Option<u32>,
    /// Official world golf ranking.
    #[serde(default)]
    pub owgr_rank: Option<u32>,
    /// Strokes-gained skill estimate, roughly -3..+3.
    #[serde(default)]
    pub dg_skill_estimate: Option<f64>,
    /// Change in skill estimate over recent events.
    #[serde(default)]
    pub recent_form: Option<f64>,
}

/// Schedule response.
#[derive(Debug, Deserialize)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub current_season: Option<i32>,
    pub schedule: Vec<ScheduleEntry>,
}

/// One scheduled event in the source schema.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleEntry {
    pub event_id: IdValue,
    pub event_name: String,
    pub course: String,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    /// Source status; ignored in favour of the date comparison.
    #[serde(default)]
    pub status: Option<String>,
}

/// In-play leaderboard response.
#[derive(Debug, Deserialize)]
pub struct LeaderboardResponse {
    pub info: LeaderboardInfo,
    pub data: Vec<LeaderboardEntry>,
}

/// Event header of a leaderboard.
#[derive(Debug, Deserialize)]
pub struct LeaderboardInfo {
    #[serde(default)]
    pub event_id: Option<IdValue>,
    pub event_name: String,
    /// `YYYY-MM-DD HH:MM:SS` UTC.
    #[serde(default)]
    pub last_update: Option<String>,
}

/// One player's leaderboard line in the source schema.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardEntry {
    pub dg_id: u64,
    pub player_name: String,
    pub current_pos: String,
    pub current_score: i32,
    pub thru: IdValue,
    #[serde(default)]
    pub today: Option<i32>,
    #[serde(default, rename = "R1")]
    pub r1: Option<u32>,
    #[serde(default, rename = "R2")]
    pub r2: Option<u32>,
    #[serde(default, rename = "R3")]
    pub r3: Option<u32>,
    #[serde(default, rename = "R4")]
    pub r4: Option<u32>,
}

/// A value the source sends either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for IdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Events run Thursday to Sunday.
const EVENT_LENGTH_DAYS: i64 = 3;

/// ISO-3166 alpha-3 codes used by the source, for common golf nations.
const COUNTRIES: &[(&str, &str)] = &[
    ("ARG", "Argentina"),
    ("AUS", "Australia"),
    ("AUT", "Austria"),
    ("BEL", "Belgium"),
    ("CAN", "Canada"),
    ("CHI", "Chile"),
    ("CHN", "China"),
    ("COL", "Colombia"),
    ("DEN", "Denmark"),
    ("ENG", "England"),
    ("ESP", "Spain"),
    ("FIN", "Finland"),
    ("FRA", "France"),
    ("GER", "Germany"),
    ("IRL", "Ireland"),
    ("ITA", "Italy"),
    ("JPN", "Japan"),
    ("KOR", "South Korea"),
    ("MEX", "Mexico"),
    ("NIR", "Northern Ireland"),
    ("NOR", "Norway"),
    ("NZL", "New Zealand"),
    ("PHI", "Philippines"),
    ("POL", "Poland"),
    ("RSA", "South Africa"),
    ("SCO", "Scotland"),
    ("SWE", "Sweden"),
    ("THA", "Thailand"),
    ("TPE", "Chinese Taipei"),
    ("USA", "United States"),
    ("VEN", "Venezuela"),
    ("WAL", "Wales"),
    ("ZIM", "Zimbabwe"),
];

/// Translates a country code to its display name. Unknown codes pass through.
#[must_use]
pub fn country_name(code: &str) -> String {
    let upper = code.trim().to_uppercase();
    COUNTRIES
        .iter()
        .find(|(c, _)| *c == upper)
        .map_or_else(|| code.trim().to_string(), |(_, name)| (*name).to_string())
}

/// Maps a strokes-gained estimate onto 0-100.
#[must_use]
pub fn rating_from_estimate(estimate: f64) -> f64 {
    (50.0 + 10.0 * estimate).clamp(0.0, 100.0)
}

/// Splits "Last, First" into (display name, first, last).
#[must_use]
pub fn split_name(raw: &str) -> (String, Option<String>, Option<String>) {
    match raw.split_once(',') {
        Some((last, first)) => {
            let last = last.trim();
            let first = first.trim();
            if first.is_empty() {
                (last.to_string(), None, Some(last.to_string()))
            } else {
                (
                    format!("{} {}", first, last),
                    Some(first.to_string()),
                    Some(last.to_string()),
                )
            }
        }
        None => (raw.trim().to_string(), None, None),
    }
}

impl RankingEntry {
    /// Translates into the data model. Entries with no rank are dropped.
    #[must_use]
    pub fn into_ranking(self) -> Option<GolferRanking> {
        let world_rank = self.owgr_rank.or(self.datagolf_rank)?;
        let (name, first_name, last_name) = split_name(&self.player_name);

        Some(GolferRanking {
            id: self.dg_id.to_string(),
            name,
            first_name,
            last_name,
            world_rank,
            skill_rating: self.dg_skill_estimate.map(rating_from_estimate),
            form_rating: self.recent_form.map(rating_from_estimate),
            country: self.country.as_deref().map(country_name),
            external_id: Some(self.dg_id.to_string()),
        })
    }
}

impl ScheduleEntry {
    /// Translates into the data model with status derived from `today`.
    ///
    /// Entries with an unparseable start date are dropped.
    #[must_use]
    pub fn into_tournament(self, today: NaiveDate) -> Option<Tournament> {
        let start_date = NaiveDate::parse_from_str(self.start_date.trim(), "%Y-%m-%d").ok()?;
        let end_date = start_date + Duration::days(EVENT_LENGTH_DAYS);
        let id = self.event_id.to_string();

        Some(Tournament {
            id: id.clone(),
            name: self.event_name,
            course: self.course,
            start_date,
            end_date,
            status: TournamentStatus::derive(start_date, end_date, today),
            purse: None,
            external_id: Some(id),
        })
    }
}

impl LeaderboardInfo {
    /// Identifier of the event: the source ID when sent, else a slug of the
    /// event name.
    #[must_use]
    pub fn tournament_id(&self) -> String {
        match &self.event_id {
            Some(id) => id.to_string(),
            None => slug(&self.event_name),
        }
    }

    /// Parses `last_update`, falling back to `fallback`.
    #[must_use]
    pub fn updated_at(&self, fallback: DateTime<Utc>) -> DateTime<Utc> {
        self.last_update
            .as_deref()
            .and_then(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .ok()
                    .or_else(|| {
                        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                            .ok()
                            .map(|naive| naive.and_utc())
                    })
            })
            .unwrap_or(fallback)
    }
}

impl LeaderboardEntry {
    /// Translates into the data model.
    #[must_use]
    pub fn into_live_score(
        self,
        tournament_id: &str,
        tournament_name: &str,
        updated_at: DateTime<Utc>,
    ) -> LiveScore {
        let (golfer_name, _, _) = split_name(&self.player_name);
        let thru = match &self.thru {
            IdValue::Number(holes) => Thru::Holes(u8::try_from(*holes).unwrap_or(0)),
            IdValue::Text(raw) => Thru::parse(raw),
        };
        let rounds = [self.r1, self.r2, self.r3, self.r4]
            .into_iter()
            .map_while(|r| r)
            .collect();

        LiveScore {
            tournament_id: tournament_id.to_string(),
            tournament_name: tournament_name.to_string(),
            golfer_id: self.dg_id.to_string(),
            golfer_name,
            position: Position::parse(&self.current_pos),
            total_score: self.current_score,
            thru,
            today: self.today,
            rounds,
            updated_at,
        }
    }
}

fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name("Scheffler, Scottie"),
            (
                "Scottie Scheffler".to_string(),
                Some("Scottie".to_string()),
                Some("Scheffler".to_string())
            )
        );
        assert_eq!(split_name("Tiger Woods").0, "Tiger Woods");
        assert_eq!(split_name("Woods,").0, "Woods");
    }

    #[test]
    fn test_country_name() {
        assert_eq!(country_name("USA"), "United States");
        assert_eq!(country_name("nir"), "Northern Ireland");
        assert_eq!(country_name("XYZ"), "XYZ");
    }

    #[test]
    fn test_rating_from_estimate_is_clamped() {
        assert!((rating_from_estimate(2.5) - 75.0).abs() < f64::EPSILON);
        assert!((rating_from_estimate(0.0) - 50.0).abs() < f64::EPSILON);
        assert!((rating_from_estimate(7.0) - 100.0).abs() < f64::EPSILON);
        assert!((rating_from_estimate(-9.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ranking_translation() {
        let entry: RankingEntry = serde_json::from_value(serde_json::json!({
            "dg_id": 18417,
            "player_name": "Scheffler, Scottie",
            "country": "USA",
            "datagolf_rank": 1,
            "owgr_rank": 1,
            "dg_skill_estimate": 3.1,
            "primary_tour": "PGA"
        }))
        .unwrap();

        let ranking = entry.into_ranking().unwrap();
        assert_eq!(ranking.id, "18417");
        assert_eq!(ranking.name, "Scottie Scheffler");
        assert_eq!(ranking.last_name.as_deref(), Some("Scheffler"));
        assert_eq!(ranking.world_rank, 1);
        assert_eq!(ranking.country.as_deref(), Some("United States"));
        assert!((ranking.skill_rating.unwrap() - 81.0).abs() < 1e-9);
        assert_eq!(ranking.form_rating, None);
        assert_eq!(ranking.external_id.as_deref(), Some("18417"));
    }

    #[test]
    fn test_unranked_entry_is_dropped() {
        let entry: RankingEntry = serde_json::from_value(serde_json::json!({
            "dg_id": 1,
            "player_name": "Amateur, Some"
        }))
        .unwrap();
        assert!(entry.into_ranking().is_none());
    }

    #[test]
    fn test_schedule_status_ignores_source_status() {
        let entry: ScheduleEntry = serde_json::from_value(serde_json::json!({
            "event_id": 14,
            "event_name": "Masters Tournament",
            "course": "Augusta National Golf Club",
            "start_date": "2024-04-11",
            "status": "completed"
        }))
        .unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 4, 13).unwrap();
        let tournament = entry.into_tournament(today).unwrap();
        assert_eq!(tournament.id, "14");
        assert_eq!(tournament.end_date, NaiveDate::from_ymd_opt(2024, 4, 14).unwrap());
        assert_eq!(tournament.status, TournamentStatus::InProgress);
    }

    #[test]
    fn test_leaderboard_translation() {
        let entry: LeaderboardEntry = serde_json::from_value(serde_json::json!({
            "dg_id": 18417,
            "player_name": "Scheffler, Scottie",
            "current_pos": "T2",
            "current_score": -9,
            "thru": 14,
            "today": -4,
            "R1": 68,
            "R2": 67,
            "R3": null
        }))
        .unwrap();

        let now = Utc.with_ymd_and_hms(2024, 4, 12, 20, 0, 0).unwrap();
        let score = entry.into_live_score("14", "Masters Tournament", now);
        assert_eq!(score.golfer_name, "Scottie Scheffler");
        assert_eq!(score.position, Position::Place { rank: 2, tied: true });
        assert_eq!(score.thru, Thru::Holes(14));
        assert_eq!(score.rounds, vec![68, 67]);
        assert_eq!(score.total_score, -9);
        assert_eq!(score.today, Some(-4));
    }

    #[test]
    fn test_leaderboard_info_fallbacks() {
        let info: LeaderboardInfo = serde_json::from_value(serde_json::json!({
            "event_name": "The Open Championship",
            "last_update": "2024-07-19 16:30:00"
        }))
        .unwrap();

        assert_eq!(info.tournament_id(), "the-open-championship");
        let fallback = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            info.updated_at(fallback),
            Utc.with_ymd_and_hms(2024, 7, 19, 16, 30, 0).unwrap()
        );
    }
}
