//! Data access for previously ingested golf records.
//!
//! [`DatabaseProvider`](crate::DatabaseProvider) reads through a
//! [`GolfRecordStore`]; the MySQL implementation lives in [`mysql`].

pub mod mysql;

pub use mysql::MySqlGolfRecordStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use fairway_core::{FairwayResult, GolferRanking};
use serde::{Deserialize, Serialize};

/// A persisted tournament. Status is not stored; it is derived on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentRecord {
    pub id: String,
    pub name: String,
    pub course: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub purse: Option<u64>,
    pub external_id: Option<String>,
}

/// Read access to ingested golfers and tournaments.
#[async_trait]
pub trait GolfRecordStore: Send + Sync {
    /// Golfers ordered by world rank ascending, at most `limit`.
    async fn ranked_golfers(&self, limit: usize) -> FairwayResult<Vec<GolferRanking>>;

    /// A golfer by local ID.
    async fn golfer_by_id(&self, id: &str) -> FairwayResult<Option<GolferRanking>>;

    /// Tournaments starting in `season` (all when `None`), by start date.
    async fn tournaments(&self, season: Option<i32>) -> FairwayResult<Vec<TournamentRecord>>;

    /// Verifies the store is reachable.
    async fn ping(&self) -> FairwayResult<()>;
}
