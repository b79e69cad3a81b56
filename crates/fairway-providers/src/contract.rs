//! The golf-data provider contract.

use async_trait::async_trait;
use fairway_core::{
    FairwayError, FairwayResult, GolferRanking, LiveScore, ProviderConfig, ProviderMetadata,
    Tournament, TournamentFilter,
};
use std::sync::OnceLock;

/// A pluggable source of golf data.
///
/// `initialize` must succeed exactly once before any other method; until
/// then every data method fails with [`FairwayError::NotInitialized`].
/// Configuration problems surface from `initialize`, never from first use.
#[async_trait]
pub trait GolfDataProvider: Send + Sync {
    /// Validates `config` and prepares the provider for use.
    async fn initialize(&self, config: ProviderConfig) -> FairwayResult<()>;

    /// Read-only description of this provider.
    fn metadata(&self) -> ProviderMetadata;

    /// Top `limit` golfers ordered by world rank ascending.
    async fn get_rankings(&self, limit: usize) -> FairwayResult<Vec<GolferRanking>>;

    /// Leaderboard for `tournament_id`, or the current event when `None`.
    ///
    /// Providers without live data return an empty list.
    async fn get_live_scores(&self, tournament_id: Option<&str>) -> FairwayResult<Vec<LiveScore>>;

    /// Tournament schedule narrowed by `filter`, ordered by start date.
    async fn get_tournaments(&self, filter: &TournamentFilter) -> FairwayResult<Vec<Tournament>>;

    /// A single golfer, or `None` if unknown.
    async fn get_golfer_details(&self, golfer_id: &str) -> FairwayResult<Option<GolferRanking>>;

    /// Probes the underlying source.
    async fn health_check(&self) -> FairwayResult<bool>;
}

/// Initialise-once holder for a provider's runtime state.
#[derive(Debug)]
pub struct ProviderState<S> {
    provider: &'static str,
    cell: OnceLock<S>,
}

impl<S> ProviderState<S> {
    /// Creates an empty holder for the provider named `provider`.
    #[must_use]
    pub const fn new(provider: &'static str) -> Self {
        Self {
            provider,
            cell: OnceLock::new(),
        }
    }

    /// Stores the state. Fails if it was already stored.
    pub fn init(&self, state: S) -> FairwayResult<&S> {
        self.cell
            .set(state)
            .map_err(|_| FairwayError::AlreadyInitialized(self.provider.to_string()))?;
        self.get()
    }

    /// Returns the state, or `NotInitialized` before `init`.
    pub fn get(&self) -> FairwayResult<&S> {
        self.cell
            .get()
            .ok_or_else(|| FairwayError::NotInitialized(self.provider.to_string()))
    }

    /// Returns an error if the state was already stored.
    pub fn ensure_uninitialized(&self) -> FairwayResult<()> {
        if self.is_initialized() {
            return Err(FairwayError::AlreadyInitialized(self.provider.to_string()));
        }
        Ok(())
    }

    /// Returns true once `init` has succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}
