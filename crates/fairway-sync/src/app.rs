//! Application wiring.

use crate::refresh::Refresher;
use fairway_cache::{register_metrics, TieredCacheStore};
use fairway_config::{AppConfig, ProviderKind};
use fairway_core::{Clock, FairwayResult, SystemClock};
use fairway_providers::{
    create_pool, CachedProvider, DatabasePool, GolfDataProvider, MySqlGolfRecordStore,
    ProviderFactory,
};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Everything the daemon runs: the store, the decorated provider and,
/// for the database provider, its pool.
pub struct App {
    config: AppConfig,
    store: Arc<TieredCacheStore>,
    provider: Arc<CachedProvider>,
    pool: Option<Arc<DatabasePool>>,
}

impl App {
    /// Connects the cache, builds and initializes the configured provider.
    pub async fn build(config: AppConfig) -> FairwayResult<Self> {
        register_metrics();

        let store = Arc::new(TieredCacheStore::connect(&config.cache, &config.redis).await?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let mut factory = ProviderFactory::new(Arc::clone(&clock));

        let pool = match config.provider.kind {
            ProviderKind::Database => {
                let pool = create_pool(&config.database).await?;
                factory = factory.with_record_store(Arc::new(MySqlGolfRecordStore::new(Arc::clone(&pool))));
                Some(pool)
            }
            ProviderKind::ExternalApi => None,
        };

        let provider = factory
            .create_cached(
                config.provider.kind,
                config.provider.to_provider_config(),
                config.cache.live_ttl(),
                Arc::clone(&store),
            )
            .await?;

        Ok(Self::from_parts(config, store, Arc::new(provider), pool))
    }

    /// Assembles an app from already built parts.
    #[must_use]
    pub fn from_parts(
        config: AppConfig,
        store: Arc<TieredCacheStore>,
        provider: Arc<CachedProvider>,
        pool: Option<Arc<DatabasePool>>,
    ) -> Self {
        Self {
            config,
            store,
            provider,
            pool,
        }
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<CachedProvider> {
        &self.provider
    }

    #[must_use]
    pub fn store(&self) -> &Arc<TieredCacheStore> {
        &self.store
    }

    /// Runs cache maintenance and the refresher until `shutdown` resolves.
    pub async fn run<S>(self, shutdown: S) -> FairwayResult<()>
    where
        S: Future<Output = ()>,
    {
        let (shutdown_tx, _) = broadcast::channel(1);

        let maintenance = self
            .store
            .spawn_maintenance(self.config.cache.cleanup_interval(), shutdown_tx.subscribe());

        let provider: Arc<dyn GolfDataProvider> = self.provider.clone();
        let refresher = Arc::new(Refresher::new(
            provider,
            &self.config.sync,
            self.config.provider.kind.supports_live_scores(),
        ));
        let refresh = refresher.spawn(shutdown_tx.subscribe());

        shutdown.await;
        info!("Shutting down background tasks...");
        let _ = shutdown_tx.send(());

        for (name, handle) in [("maintenance", maintenance), ("refresh", refresh)] {
            if let Err(e) = handle.await {
                warn!(task = name, error = %e, "Background task ended abnormally");
            }
        }

        let stats = self.provider.cache_stats();
        info!(
            backend = %stats.backend,
            local_entries = stats.local_entries,
            "Final cache state"
        );

        if let Some(pool) = &self.pool {
            pool.close().await;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
