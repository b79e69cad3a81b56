//! Provider backed by a third-party golf-data HTTP API.

pub mod schema;

use crate::contract::{GolfDataProvider, ProviderState};
use async_trait::async_trait;
use fairway_core::{
    top_ranked, Clock, FairwayError, FairwayResult, GolferRanking, LiveScore, ProviderConfig,
    ProviderMetadata, RatePeriod, Tournament, TournamentFilter,
};
use fairway_resilience::{RateLimiter, RetryableFetcher, Sleeper};
use parking_lot::RwLock;
use schema::{LeaderboardResponse, RankingsResponse, ScheduleResponse};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Default upstream endpoint.
pub const DEFAULT_BASE_URL: &str = "https://feeds.datagolf.com";

/// Requests per minute the upstream allows.
pub const REQUESTS_PER_MINUTE: u32 = 45;

const PROVIDER_NAME: &str = "external_api";
const TOUR: &str = "pga";

const RANKINGS_PATH: &str = "preds/get-dg-rankings";
const SCHEDULE_PATH: &str = "get-schedule";
const LEADERBOARD_PATH: &str = "preds/in-play";

struct ExternalState {
    base_url: String,
    api_key: String,
    fetcher: RetryableFetcher,
    limiter: RateLimiter,
}

/// Translates a third-party rankings/schedule/leaderboard API into the
/// data model.
///
/// Every request carries the API key and `file_format=json` as query
/// parameters, waits on the advertised rate limit and goes through a
/// [`RetryableFetcher`].
pub struct ExternalApiProvider {
    clock: Arc<dyn Clock>,
    sleeper: Option<Arc<dyn Sleeper>>,
    state: ProviderState<ExternalState>,
    metadata: RwLock<ProviderMetadata>,
}

impl ExternalApiProvider {
    /// Creates an uninitialized provider.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            sleeper: None,
            state: ProviderState::new(PROVIDER_NAME),
            metadata: RwLock::new(
                ProviderMetadata::new(PROVIDER_NAME, env!("CARGO_PKG_VERSION"))
                    .with_rate_limit(REQUESTS_PER_MINUTE, RatePeriod::Minute),
            ),
        }
    }

    /// Replaces the sleeper used between retries.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> FairwayResult<T> {
        let state = self.state.get()?;
        state.limiter.wait().await;

        let url = format!("{}/{}", state.base_url, path);
        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("file_format", "json"));
        query.push(("key", state.api_key.as_str()));

        let payload = state.fetcher.get_json(&url, &query).await?;
        self.metadata.write().last_sync = Some(self.clock.now());
        Ok(payload)
    }

    async fn all_rankings(&self) -> FairwayResult<Vec<GolferRanking>> {
        let response: RankingsResponse = self.fetch(RANKINGS_PATH, &[]).await?;
        debug!(
            count = response.rankings.len(),
            last_updated = response.last_updated.as_deref().unwrap_or("unknown"),
            "Fetched upstream rankings"
        );

        Ok(response
            .rankings
            .into_iter()
            .filter_map(schema::RankingEntry::into_ranking)
            .collect())
    }
}

fn validate_base_url(raw: &str) -> FairwayResult<String> {
    let url = Url::parse(raw)
        .map_err(|e| FairwayError::Configuration(format!("Invalid base URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        other => Err(FairwayError::Configuration(format!(
            "Base URL must use http or https, got '{}'",
            other
        ))),
    }
}

#[async_trait]
impl GolfDataProvider for ExternalApiProvider {
    async fn initialize(&self, config: ProviderConfig) -> FairwayResult<()> {
        self.state.ensure_uninitialized()?;

        let api_key = config
            .api_key()
            .ok_or_else(|| FairwayError::configuration("External API provider requires an API key"))?
            .to_string();
        let base_url = validate_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let mut fetcher = RetryableFetcher::new(PROVIDER_NAME, config.timeout(), config.retry_attempts)?;
        if let Some(sleeper) = &self.sleeper {
            fetcher = fetcher.with_sleeper(Arc::clone(sleeper));
        }

        let rate_limit = self.metadata.read().rate_limit;
        let limiter = rate_limit.map_or_else(
            || RateLimiter::per_minute(REQUESTS_PER_MINUTE),
            |limit| RateLimiter::from_rate_limit(&limit),
        );

        self.state.init(ExternalState {
            base_url: base_url.clone(),
            api_key,
            fetcher,
            limiter,
        })?;

        info!(provider = PROVIDER_NAME, base_url = %base_url, "Provider initialized");
        Ok(())
    }

    fn metadata(&self) -> ProviderMetadata {
        self.metadata.read().clone()
    }

    async fn get_rankings(&self, limit: usize) -> FairwayResult<Vec<GolferRanking>> {
        let rankings = self.all_rankings().await?;
        Ok(top_ranked(rankings, limit))
    }

    async fn get_live_scores(&self, tournament_id: Option<&str>) -> FairwayResult<Vec<LiveScore>> {
        let response: LeaderboardResponse = self
            .fetch(LEADERBOARD_PATH, &[("tour", TOUR), ("odds_format", "percent")])
            .await?;

        let current_id = response.info.tournament_id();
        if let Some(requested) = tournament_id {
            if requested != current_id {
                debug!(requested, current = %current_id, "Requested tournament is not in play");
                return Ok(Vec::new());
            }
        }

        let updated_at = response.info.updated_at(self.clock.now());
        let event_name = response.info.event_name;

        Ok(response
            .data
            .into_iter()
            .map(|entry| entry.into_live_score(&current_id, &event_name, updated_at))
            .collect())
    }

    async fn get_tournaments(&self, filter: &TournamentFilter) -> FairwayResult<Vec<Tournament>> {
        let response: ScheduleResponse = self.fetch(SCHEDULE_PATH, &[("tour", TOUR)]).await?;
        debug!(
            season = ?response.current_season,
            count = response.schedule.len(),
            "Fetched upstream schedule"
        );

        let today = self.clock.today();
        let tournaments = response
            .schedule
            .into_iter()
            .filter_map(|entry| entry.into_tournament(today))
            .collect();

        Ok(filter.apply(tournaments))
    }

    async fn get_golfer_details(&self, golfer_id: &str) -> FairwayResult<Option<GolferRanking>> {
        // No single-golfer endpoint upstream.
        let rankings = self.all_rankings().await?;
        Ok(rankings.into_iter().find(|golfer| golfer.has_id(golfer_id)))
    }

    async fn health_check(&self) -> FairwayResult<bool> {
        self.state.get()?;

        match self.fetch::<ScheduleResponse>(SCHEDULE_PATH, &[("tour", TOUR)]).await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(provider = PROVIDER_NAME, error = %e, "Health check failed");
                Ok(false)
            }
        }
    }
}
