//! Cache-aside decorator over any provider.

use crate::contract::GolfDataProvider;
use async_trait::async_trait;
use fairway_cache::{keys, CacheStats, TieredCacheStore};
use fairway_core::{
    Clock, FairwayResult, GolferRanking, LiveScore, ProviderConfig, ProviderMetadata, Tournament,
    TournamentFilter,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// TTL for rankings, schedules and golfer details.
pub const LONG_TTL: Duration = Duration::from_secs(3600);

/// TTL for live scores.
pub const LIVE_TTL: Duration = Duration::from_secs(30);

/// Wraps a provider with per-method cache-aside reads.
///
/// Rankings, schedules and golfer details use a long TTL; live scores a
/// short one. Rankings keys are scoped to the current date and limit.
/// `health_check` always reaches the wrapped provider.
pub struct CachedProvider {
    inner: Arc<dyn GolfDataProvider>,
    store: Arc<TieredCacheStore>,
    clock: Arc<dyn Clock>,
    long_ttl: Duration,
    live_ttl: Duration,
}

impl CachedProvider {
    /// Wraps `inner` with the default TTLs.
    #[must_use]
    pub fn new(
        inner: Arc<dyn GolfDataProvider>,
        store: Arc<TieredCacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner,
            store,
            clock,
            long_ttl: LONG_TTL,
            live_ttl: LIVE_TTL,
        }
    }

    /// Overrides the long and live TTLs.
    #[must_use]
    pub fn with_ttls(mut self, long_ttl: Duration, live_ttl: Duration) -> Self {
        self.long_ttl = long_ttl;
        self.live_ttl = live_ttl;
        self
    }

    /// The wrapped provider.
    #[must_use]
    pub fn inner(&self) -> &Arc<dyn GolfDataProvider> {
        &self.inner
    }

    /// Removes cached entries matching `pattern` (relative to the store
    /// namespace, e.g. `rankings:*`), or every entry when `None`.
    pub async fn invalidate_cache(&self, pattern: Option<&str>) -> FairwayResult<usize> {
        self.store.clear(pattern).await
    }

    /// Operational snapshot of the underlying store.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.store.stats()
    }
}

#[async_trait]
impl GolfDataProvider for CachedProvider {
    async fn initialize(&self, config: ProviderConfig) -> FairwayResult<()> {
        self.inner.initialize(config).await
    }

    fn metadata(&self) -> ProviderMetadata {
        self.inner.metadata()
    }

    async fn get_rankings(&self, limit: usize) -> FairwayResult<Vec<GolferRanking>> {
        let key = keys::rankings(self.clock.today(), limit);
        self.store
            .get_or_set(&key, self.long_ttl, || self.inner.get_rankings(limit))
            .await
    }

    async fn get_live_scores(&self, tournament_id: Option<&str>) -> FairwayResult<Vec<LiveScore>> {
        let key = keys::live_scores(tournament_id);
        self.store
            .get_or_set(&key, self.live_ttl, || self.inner.get_live_scores(tournament_id))
            .await
    }

    async fn get_tournaments(&self, filter: &TournamentFilter) -> FairwayResult<Vec<Tournament>> {
        let key = keys::tournaments(filter);
        self.store
            .get_or_set(&key, self.long_ttl, || self.inner.get_tournaments(filter))
            .await
    }

    async fn get_golfer_details(&self, golfer_id: &str) -> FairwayResult<Option<GolferRanking>> {
        let key = keys::golfer(golfer_id);
        if let Some(cached) = self.store.get::<GolferRanking>(&key).await {
            return Ok(Some(cached));
        }

        // Unknown golfers are not cached.
        let golfer = self.inner.get_golfer_details(golfer_id).await?;
        if let Some(found) = &golfer {
            if let Err(e) = self.store.set(&key, found, Some(self.long_ttl)).await {
                warn!(key = %key, error = %e, "Failed to cache golfer details");
            }
        } else {
            debug!(golfer_id, "Golfer not found");
        }

        Ok(golfer)
    }

    async fn health_check(&self) -> FairwayResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fairway_cache::NullBackend;
    use fairway_core::{FairwayError, FixedClock, Position, Thru};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Provider that counts calls per method.
    #[derive(Default)]
    struct CountingProvider {
        rankings: AtomicU32,
        live: AtomicU32,
        tournaments: AtomicU32,
        golfer: AtomicU32,
        health: AtomicU32,
    }

    #[async_trait]
    impl GolfDataProvider for CountingProvider {
        async fn initialize(&self, _config: ProviderConfig) -> FairwayResult<()> {
            Ok(())
        }

        fn metadata(&self) -> ProviderMetadata {
            ProviderMetadata::new("counting", "0.0.0")
        }

        async fn get_rankings(&self, limit: usize) -> FairwayResult<Vec<GolferRanking>> {
            self.rankings.fetch_add(1, Ordering::SeqCst);
            Ok((1..=limit as u32)
                .map(|rank| GolferRanking::new(rank.to_string(), format!("Golfer {}", rank), rank))
                .collect())
        }

        async fn get_live_scores(&self, tournament_id: Option<&str>) -> FairwayResult<Vec<LiveScore>> {
            self.live.fetch_add(1, Ordering::SeqCst);
            Ok(vec![LiveScore {
                tournament_id: tournament_id.unwrap_or("14").to_string(),
                tournament_name: "Masters Tournament".to_string(),
                golfer_id: "1".to_string(),
                golfer_name: "Golfer 1".to_string(),
                position: Position::parse("1"),
                total_score: -10,
                thru: Thru::Finished,
                today: Some(-3),
                rounds: vec![68, 69],
                updated_at: Utc.with_ymd_and_hms(2024, 4, 12, 20, 0, 0).unwrap(),
            }])
        }

        async fn get_tournaments(&self, _filter: &TournamentFilter) -> FairwayResult<Vec<Tournament>> {
            self.tournaments.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn get_golfer_details(&self, golfer_id: &str) -> FairwayResult<Option<GolferRanking>> {
            self.golfer.fetch_add(1, Ordering::SeqCst);
            if golfer_id == "missing" {
                return Ok(None);
            }
            if golfer_id == "error" {
                return Err(FairwayError::Network("upstream down".into()));
            }
            Ok(Some(GolferRanking::new(golfer_id, "Jon Rahm", 7)))
        }

        async fn health_check(&self) -> FairwayResult<bool> {
            self.health.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    fn setup() -> (Arc<CountingProvider>, CachedProvider) {
        let inner = Arc::new(CountingProvider::default());
        let store = Arc::new(TieredCacheStore::new("test", Arc::new(NullBackend)));
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()));
        let cached = CachedProvider::new(inner.clone(), store, clock);
        (inner, cached)
    }

    #[tokio::test]
    async fn test_rankings_cached_per_limit() {
        let (inner, cached) = setup();

        assert_eq!(cached.get_rankings(10).await.unwrap().len(), 10);
        assert_eq!(cached.get_rankings(10).await.unwrap().len(), 10);
        assert_eq!(inner.rankings.load(Ordering::SeqCst), 1);

        assert_eq!(cached.get_rankings(5).await.unwrap().len(), 5);
        assert_eq!(inner.rankings.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_scores_use_short_ttl() {
        let (inner, cached) = setup();

        cached.get_live_scores(Some("14")).await.unwrap();
        cached.get_live_scores(Some("14")).await.unwrap();
        assert_eq!(inner.live.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        cached.get_live_scores(Some("14")).await.unwrap();
        assert_eq!(inner.live.load(Ordering::SeqCst), 2);

        // Long-TTL data survives the same interval.
        cached.get_rankings(3).await.unwrap();
        tokio::time::advance(Duration::from_secs(31)).await;
        cached.get_rankings(3).await.unwrap();
        assert_eq!(inner.rankings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tournaments_keyed_by_filter() {
        let (inner, cached) = setup();

        cached.get_tournaments(&TournamentFilter::default()).await.unwrap();
        cached.get_tournaments(&TournamentFilter::default()).await.unwrap();
        assert_eq!(inner.tournaments.load(Ordering::SeqCst), 1);

        let filter = TournamentFilter {
            season: Some(2024),
            ..TournamentFilter::default()
        };
        cached.get_tournaments(&filter).await.unwrap();
        assert_eq!(inner.tournaments.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_golfer_details_cache_hits_but_not_misses() {
        let (inner, cached) = setup();

        assert!(cached.get_golfer_details("19195").await.unwrap().is_some());
        assert!(cached.get_golfer_details("19195").await.unwrap().is_some());
        assert_eq!(inner.golfer.load(Ordering::SeqCst), 1);

        assert!(cached.get_golfer_details("missing").await.unwrap().is_none());
        assert!(cached.get_golfer_details("missing").await.unwrap().is_none());
        assert_eq!(inner.golfer.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_errors_propagate_and_are_not_cached() {
        let (inner, cached) = setup();

        assert!(cached.get_golfer_details("error").await.is_err());
        assert!(cached.get_golfer_details("error").await.is_err());
        assert_eq!(inner.golfer.load(Ordering::SeqCst), 2);
        assert_eq!(cached.cache_stats().local_entries, 0);
    }

    #[tokio::test]
    async fn test_health_check_bypasses_cache() {
        let (inner, cached) = setup();

        assert!(cached.health_check().await.unwrap());
        assert!(cached.health_check().await.unwrap());
        assert_eq!(inner.health.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_cache_by_pattern() {
        let (inner, cached) = setup();

        cached.get_rankings(3).await.unwrap();
        cached.get_golfer_details("7").await.unwrap();
        assert_eq!(cached.cache_stats().local_entries, 2);

        assert_eq!(cached.invalidate_cache(Some("rankings:*")).await.unwrap(), 1);
        cached.get_rankings(3).await.unwrap();
        cached.get_golfer_details("7").await.unwrap();
        assert_eq!(inner.rankings.load(Ordering::SeqCst), 2);
        assert_eq!(inner.golfer.load(Ordering::SeqCst), 1);

        assert_eq!(cached.invalidate_cache(None).await.unwrap(), 2);
        assert_eq!(cached.cache_stats().local_entries, 0);
    }
}
