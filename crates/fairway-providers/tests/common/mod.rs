//! Shared fakes for provider integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use fairway_core::{
    FairwayError, FairwayResult, GolferRanking, LiveScore, Position, ProviderConfig,
    ProviderMetadata, Thru, Tournament, TournamentFilter,
};
use fairway_providers::GolfDataProvider;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use parking_lot::Mutex;

/// Provider serving a fixed field of golfers and counting every call.
#[derive(Default)]
pub struct CountingProvider {
    calls: Mutex<HashMap<&'static str, u32>>,
    failing: AtomicBool,
}

impl CountingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `method` reached this provider.
    pub fn calls(&self, method: &str) -> u32 {
        self.calls.lock().get(method).copied().unwrap_or(0)
    }

    /// Makes every data method fail with a network error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn record(&self, method: &'static str) -> FairwayResult<()> {
        *self.calls.lock().entry(method).or_insert(0) += 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(FairwayError::Network("upstream unreachable".to_string()));
        }
        Ok(())
    }
}

pub fn golfer(rank: u32) -> GolferRanking {
    GolferRanking::new(format!("g{}", rank), format!("Golfer {}", rank), rank)
}

#[async_trait]
impl GolfDataProvider for CountingProvider {
    async fn initialize(&self, _config: ProviderConfig) -> FairwayResult<()> {
        Ok(())
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata::new("counting", "1.0.0")
    }

    async fn get_rankings(&self, limit: usize) -> FairwayResult<Vec<GolferRanking>> {
        self.record("get_rankings")?;
        Ok((1..=200).map(golfer).take(limit).collect())
    }

    async fn get_live_scores(&self, tournament_id: Option<&str>) -> FairwayResult<Vec<LiveScore>> {
        self.record("get_live_scores")?;
        Ok(vec![LiveScore {
            tournament_id: tournament_id.unwrap_or("current").to_string(),
            tournament_name: "The Open".to_string(),
            golfer_id: "g1".to_string(),
            golfer_name: "Golfer 1".to_string(),
            position: Position::parse("T1"),
            total_score: -8,
            thru: Thru::Holes(14),
            today: Some(-2),
            rounds: vec![67, 69],
            updated_at: chrono::Utc::now(),
        }])
    }

    async fn get_tournaments(&self, filter: &TournamentFilter) -> FairwayResult<Vec<Tournament>> {
        self.record("get_tournaments")?;
        Ok(filter.apply(Vec::new()))
    }

    async fn get_golfer_details(&self, golfer_id: &str) -> FairwayResult<Option<GolferRanking>> {
        self.record("get_golfer_details")?;
        Ok((1..=200).map(golfer).find(|g| g.has_id(golfer_id)))
    }

    async fn health_check(&self) -> FairwayResult<bool> {
        self.record("health_check")?;
        Ok(true)
    }
}
