//! Provider construction and deployment recommendations.

use crate::cached::CachedProvider;
use crate::contract::GolfDataProvider;
use crate::dao::GolfRecordStore;
use crate::database::DatabaseProvider;
use crate::external::ExternalApiProvider;
use fairway_cache::TieredCacheStore;
use fairway_config::{DeploymentScale, ProviderKind};
use fairway_core::{Clock, FairwayError, FairwayResult, ProviderConfig};
use fairway_resilience::Sleeper;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Advisory provider pairing for a deployment scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recommendation {
    pub scale: DeploymentScale,
    pub primary: ProviderKind,
    pub fallback: ProviderKind,
    pub reason: &'static str,
}

const RECOMMENDATIONS: [Recommendation; 3] = [
    Recommendation {
        scale: DeploymentScale::Startup,
        primary: ProviderKind::Database,
        fallback: ProviderKind::ExternalApi,
        reason: "Serve ingested records with no per-request cost; call the API only when the database is unavailable",
    },
    Recommendation {
        scale: DeploymentScale::Growing,
        primary: ProviderKind::ExternalApi,
        fallback: ProviderKind::Database,
        reason: "Live leaderboards need the API; cached ingested records keep pages up during upstream outages",
    },
    Recommendation {
        scale: DeploymentScale::Enterprise,
        primary: ProviderKind::ExternalApi,
        fallback: ProviderKind::Database,
        reason: "Contracted feed with a shared Redis tier across instances; database snapshots as the recovery path",
    },
];

/// Builds initialized providers from a [`ProviderKind`].
///
/// The database provider needs a [`GolfRecordStore`]; asking for it
/// without one is a configuration error.
pub struct ProviderFactory {
    clock: Arc<dyn Clock>,
    record_store: Option<Arc<dyn GolfRecordStore>>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl ProviderFactory {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            record_store: None,
            sleeper: None,
        }
    }

    /// Supplies the record store used by the database provider.
    #[must_use]
    pub fn with_record_store(mut self, store: Arc<dyn GolfRecordStore>) -> Self {
        self.record_store = Some(store);
        self
    }

    /// Supplies the retry sleeper used by HTTP providers.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    fn construct(&self, kind: ProviderKind) -> FairwayResult<Arc<dyn GolfDataProvider>> {
        match kind {
            ProviderKind::Database => {
                let store = self.record_store.clone().ok_or_else(|| {
                    FairwayError::configuration("Database provider requires a record store")
                })?;
                Ok(Arc::new(DatabaseProvider::new(store, Arc::clone(&self.clock))))
            }
            ProviderKind::ExternalApi => {
                let mut provider = ExternalApiProvider::new(Arc::clone(&self.clock));
                if let Some(sleeper) = &self.sleeper {
                    provider = provider.with_sleeper(Arc::clone(sleeper));
                }
                Ok(Arc::new(provider))
            }
        }
    }

    /// Constructs and initializes a provider of `kind`.
    pub async fn create_provider(
        &self,
        kind: ProviderKind,
        config: ProviderConfig,
    ) -> FairwayResult<Arc<dyn GolfDataProvider>> {
        let provider = self.construct(kind)?;
        provider.initialize(config).await?;

        info!(provider = %kind, "Provider created");
        Ok(provider)
    }

    /// Like [`create_provider`](Self::create_provider), selecting the kind
    /// by name. Unknown names fail with [`FairwayError::UnknownProvider`]
    /// before anything is constructed.
    pub async fn create_provider_by_name(
        &self,
        name: &str,
        config: ProviderConfig,
    ) -> FairwayResult<Arc<dyn GolfDataProvider>> {
        let kind: ProviderKind = name.parse()?;
        self.create_provider(kind, config).await
    }

    /// Creates a provider and wraps it in a [`CachedProvider`] over `store`.
    ///
    /// The config's cache duration becomes the long TTL; live scores
    /// expire after `live_ttl`.
    pub async fn create_cached(
        &self,
        kind: ProviderKind,
        config: ProviderConfig,
        live_ttl: Duration,
        store: Arc<TieredCacheStore>,
    ) -> FairwayResult<CachedProvider> {
        let long_ttl = config.cache_duration();
        let provider = self.create_provider(kind, config).await?;
        Ok(CachedProvider::new(provider, store, Arc::clone(&self.clock)).with_ttls(long_ttl, live_ttl))
    }

    /// The full recommendation table, smallest scale first.
    #[must_use]
    pub fn recommendations() -> &'static [Recommendation] {
        &RECOMMENDATIONS
    }

    /// Recommendation for `scale`.
    #[must_use]
    pub fn recommend(scale: DeploymentScale) -> Recommendation {
        match scale {
            DeploymentScale::Startup => RECOMMENDATIONS[0],
            DeploymentScale::Growing => RECOMMENDATIONS[1],
            DeploymentScale::Enterprise => RECOMMENDATIONS[2],
        }
    }
}
