//! Periodic cache warm-up.

use fairway_config::SyncConfig;
use fairway_core::TournamentFilter;
use fairway_providers::GolfDataProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// Outcome of one reference-data pass. `None` means the read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    pub healthy: bool,
    pub rankings: Option<usize>,
    pub tournaments: Option<usize>,
}

/// Reads through a (cached) provider on a schedule so requests find warm
/// entries.
///
/// Rankings and the schedule refresh on `refresh_interval`; live scores on
/// `live_interval` when the provider serves them.
pub struct Refresher {
    provider: Arc<dyn GolfDataProvider>,
    rankings_limit: usize,
    refresh_interval: Duration,
    live_interval: Duration,
    live_enabled: bool,
}

impl Refresher {
    #[must_use]
    pub fn new(provider: Arc<dyn GolfDataProvider>, config: &SyncConfig, live_enabled: bool) -> Self {
        Self {
            provider,
            rankings_limit: config.rankings_limit,
            refresh_interval: config.refresh_interval(),
            live_interval: config.live_refresh_interval(),
            live_enabled,
        }
    }

    /// Checks provider health and reads rankings and the schedule.
    pub async fn refresh_reference_data(&self) -> RefreshReport {
        let healthy = match self.provider.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!(error = %e, "Provider health check errored");
                false
            }
        };
        if !healthy {
            warn!(provider = %self.provider.metadata().name, "Provider reports unhealthy");
        }

        let rankings = match self.provider.get_rankings(self.rankings_limit).await {
            Ok(rankings) => Some(rankings.len()),
            Err(e) => {
                warn!(error = %e, "Rankings refresh failed");
                None
            }
        };

        let tournaments = match self.provider.get_tournaments(&TournamentFilter::default()).await {
            Ok(tournaments) => Some(tournaments.len()),
            Err(e) => {
                warn!(error = %e, "Schedule refresh failed");
                None
            }
        };

        let report = RefreshReport {
            healthy,
            rankings,
            tournaments,
        };
        info!(?report, "Reference data refreshed");
        report
    }

    /// Reads the current leaderboard.
    pub async fn refresh_live_scores(&self) -> Option<usize> {
        match self.provider.get_live_scores(None).await {
            Ok(scores) => {
                debug!(count = scores.len(), "Live scores refreshed");
                Some(scores.len())
            }
            Err(e) => {
                warn!(error = %e, "Live score refresh failed");
                None
            }
        }
    }

    /// Runs both refresh loops until `shutdown` fires. The first pass runs
    /// immediately.
    pub fn spawn(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                refresh_secs = self.refresh_interval.as_secs(),
                live_secs = self.live_interval.as_secs(),
                live_enabled = self.live_enabled,
                "Cache refresher started"
            );

            let mut reference_tick = interval(self.refresh_interval);
            let mut live_tick = interval(self.live_interval);

            loop {
                tokio::select! {
                    _ = shutdown.recv() => {
                        info!("Cache refresher received shutdown signal");
                        break;
                    }
                    _ = reference_tick.tick() => {
                        self.refresh_reference_data().await;
                    }
                    _ = live_tick.tick(), if self.live_enabled => {
                        self.refresh_live_scores().await;
                    }
                }
            }
        })
    }
}
