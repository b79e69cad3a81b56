//! Provider over previously ingested records.

use crate::contract::{GolfDataProvider, ProviderState};
use crate::dao::{GolfRecordStore, TournamentRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use fairway_core::{
    top_ranked, Clock, FairwayError, FairwayResult, GolferRanking, LiveScore, ProviderConfig,
    ProviderMetadata, Tournament, TournamentFilter, TournamentStatus,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

const PROVIDER_NAME: &str = "database";

/// Reads rankings and schedules from the application database.
///
/// Live scores are not ingested, so [`get_live_scores`] always returns an
/// empty list.
///
/// [`get_live_scores`]: GolfDataProvider::get_live_scores
pub struct DatabaseProvider {
    store: Arc<dyn GolfRecordStore>,
    clock: Arc<dyn Clock>,
    state: ProviderState<ProviderConfig>,
    metadata: RwLock<ProviderMetadata>,
}

impl DatabaseProvider {
    /// Creates an uninitialized provider.
    #[must_use]
    pub fn new(store: Arc<dyn GolfRecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            state: ProviderState::new(PROVIDER_NAME),
            metadata: RwLock::new(ProviderMetadata::new(PROVIDER_NAME, env!("CARGO_PKG_VERSION"))),
        }
    }

    fn touch_last_sync(&self) {
        self.metadata.write().last_sync = Some(self.clock.now());
    }

    fn to_tournament(record: TournamentRecord, today: NaiveDate) -> Tournament {
        Tournament {
            status: TournamentStatus::derive(record.start_date, record.end_date, today),
            id: record.id,
            name: record.name,
            course: record.course,
            start_date: record.start_date,
            end_date: record.end_date,
            purse: record.purse,
            external_id: record.external_id,
        }
    }
}

#[async_trait]
impl GolfDataProvider for DatabaseProvider {
    async fn initialize(&self, config: ProviderConfig) -> FairwayResult<()> {
        self.state.ensure_uninitialized()?;

        if config.timeout_ms == 0 {
            return Err(FairwayError::configuration(
                "Database provider requires a positive timeout",
            ));
        }

        self.state.init(config)?;
        info!(provider = PROVIDER_NAME, "Provider initialized");
        Ok(())
    }

    fn metadata(&self) -> ProviderMetadata {
        self.metadata.read().clone()
    }

    async fn get_rankings(&self, limit: usize) -> FairwayResult<Vec<GolferRanking>> {
        self.state.get()?;

        let golfers = self.store.ranked_golfers(limit).await?;
        self.touch_last_sync();
        debug!(count = golfers.len(), "Loaded rankings from database");

        // The store orders by rank; re-apply in case an implementation does not.
        Ok(top_ranked(golfers, limit))
    }

    async fn get_live_scores(&self, tournament_id: Option<&str>) -> FairwayResult<Vec<LiveScore>> {
        self.state.get()?;

        warn!(
            provider = PROVIDER_NAME,
            tournament_id = tournament_id.unwrap_or("current"),
            "Live scores are not available from the database provider"
        );
        Ok(Vec::new())
    }

    async fn get_tournaments(&self, filter: &TournamentFilter) -> FairwayResult<Vec<Tournament>> {
        self.state.get()?;

        let records = self.store.tournaments(filter.season).await?;
        self.touch_last_sync();

        let today = self.clock.today();
        let tournaments = records
            .into_iter()
            .map(|record| Self::to_tournament(record, today))
            .collect();

        Ok(filter.apply(tournaments))
    }

    async fn get_golfer_details(&self, golfer_id: &str) -> FairwayResult<Option<GolferRanking>> {
        self.state.get()?;
        self.store.golfer_by_id(golfer_id).await
    }

    async fn health_check(&self) -> FairwayResult<bool> {
        self.state.get()?;

        match self.store.ping().await {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(provider = PROVIDER_NAME, error = %e, "Health check failed");
                Ok(false)
            }
        }
    }
}
