//! MySQL golf record store.

use super::{GolfRecordStore, TournamentRecord};
use crate::pool::DatabasePool;
use async_trait::async_trait;
use chrono::NaiveDate;
use fairway_core::{FairwayError, FairwayResult, GolferRanking};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// MySQL-backed [`GolfRecordStore`].
#[derive(Clone)]
pub struct MySqlGolfRecordStore {
    pool: Arc<DatabasePool>,
}

impl MySqlGolfRecordStore {
    /// Creates a new store over `pool`.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a golfer.
#[derive(Debug, FromRow)]
struct GolferRow {
    id: String,
    name: String,
    first_name: Option<String>,
    last_name: Option<String>,
    world_rank: i32,
    skill_rating: Option<f64>,
    form_rating: Option<f64>,
    country: Option<String>,
    external_id: Option<String>,
}

impl TryFrom<GolferRow> for GolferRanking {
    type Error = FairwayError;

    fn try_from(row: GolferRow) -> Result<Self, Self::Error> {
        let world_rank = u32::try_from(row.world_rank).map_err(|_| {
            FairwayError::Internal(format!("Invalid world rank {} for golfer {}", row.world_rank, row.id))
        })?;

        Ok(GolferRanking {
            id: row.id,
            name: row.name,
            first_name: row.first_name,
            last_name: row.last_name,
            world_rank,
            skill_rating: row.skill_rating,
            form_rating: row.form_rating,
            country: row.country,
            external_id: row.external_id,
        })
    }
}

/// Database row representation of a tournament.
#[derive(Debug, FromRow)]
struct TournamentRow {
    id: String,
    name: String,
    course: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    purse: Option<i64>,
    external_id: Option<String>,
}

impl From<TournamentRow> for TournamentRecord {
    fn from(row: TournamentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            course: row.course,
            start_date: row.start_date,
            end_date: row.end_date,
            purse: row.purse.and_then(|p| u64::try_from(p).ok()),
            external_id: row.external_id,
        }
    }
}

#[async_trait]
impl GolfRecordStore for MySqlGolfRecordStore {
    async fn ranked_golfers(&self, limit: usize) -> FairwayResult<Vec<GolferRanking>> {
        debug!("Loading top {} ranked golfers", limit);

        let rows = sqlx::query_as::<_, GolferRow>(
            r#"
            SELECT id, name, first_name, last_name, world_rank,
                   skill_rating, form_rating, country, external_id
            FROM golfers
            WHERE world_rank IS NOT NULL
            ORDER BY world_rank ASC
            LIMIT ?
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(GolferRanking::try_from).collect()
    }

    async fn golfer_by_id(&self, id: &str) -> FairwayResult<Option<GolferRanking>> {
        debug!("Finding golfer by id: {}", id);

        let row = sqlx::query_as::<_, GolferRow>(
            r#"
            SELECT id, name, first_name, last_name, world_rank,
                   skill_rating, form_rating, country, external_id
            FROM golfers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(GolferRanking::try_from).transpose()
    }

    async fn tournaments(&self, season: Option<i32>) -> FairwayResult<Vec<TournamentRecord>> {
        debug!("Loading tournaments for season {:?}", season);

        let rows = sqlx::query_as::<_, TournamentRow>(
            r#"
            SELECT id, name, course, start_date, end_date, purse, external_id
            FROM tournaments
            WHERE ? IS NULL OR YEAR(start_date) = ?
            ORDER BY start_date ASC
            "#,
        )
        .bind(season)
        .bind(season)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(TournamentRecord::from).collect())
    }

    async fn ping(&self) -> FairwayResult<()> {
        self.pool.health_check().await
    }
}
