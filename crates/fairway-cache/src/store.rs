//! Two-tier cache-aside store.

use crate::backend::{KeyValueBackend, NullBackend, RedisBackend};
use crate::memory::MemoryTier;
use crate::metrics::CacheMetrics;
use crate::pattern::KeyPattern;
use fairway_config::{CacheConfig, RedisConfig};
use fairway_core::FairwayResult;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

const DISTRIBUTED: &str = "distributed";
const LOCAL: &str = "local";

/// Operational snapshot of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Distributed backend name.
    pub backend: String,
    /// Whether the distributed tier is currently believed reachable.
    pub redis_available: bool,
    /// Entries held by the local tier, including unswept expired ones.
    pub local_entries: usize,
    /// Approximate local-tier footprint in bytes.
    pub local_memory_bytes: usize,
}

/// Cache-aside store with a distributed primary tier and a local fallback.
///
/// Reads try the distributed tier when it is believed reachable and fall
/// through to the local tier on a miss or failure. Writes go to the
/// distributed tier best-effort and always to the local tier, so an outage
/// degrades to process-local caching instead of failing callers. Every key
/// is prefixed with the store namespace.
pub struct TieredCacheStore {
    namespace: String,
    backend: Arc<dyn KeyValueBackend>,
    local: Option<MemoryTier>,
    default_ttl: Duration,
}

impl std::fmt::Debug for TieredCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCacheStore")
            .field("namespace", &self.namespace)
            .field("backend", &self.backend.name())
            .field("local_tier", &self.local.is_some())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl TieredCacheStore {
    /// Creates a store over `backend` with the local tier enabled.
    #[must_use]
    pub fn new(namespace: impl Into<String>, backend: Arc<dyn KeyValueBackend>) -> Self {
        Self {
            namespace: namespace.into(),
            backend,
            local: Some(MemoryTier::new()),
            default_ttl: Duration::from_secs(3600),
        }
    }

    /// Creates a store from configuration over an existing backend.
    #[must_use]
    pub fn from_config(config: &CacheConfig, backend: Arc<dyn KeyValueBackend>) -> Self {
        if !config.memory_fallback && !backend.is_available() {
            warn!(
                backend = backend.name(),
                "Local cache tier disabled and distributed tier unavailable; nothing will be cached"
            );
        }

        Self {
            namespace: config.namespace.clone(),
            backend,
            local: config.memory_fallback.then(MemoryTier::new),
            default_ttl: config.default_ttl(),
        }
    }

    /// Builds the store, connecting to Redis when a URL is configured and
    /// falling back to [`NullBackend`] otherwise.
    pub async fn connect(cache: &CacheConfig, redis: &RedisConfig) -> FairwayResult<Self> {
        let backend: Arc<dyn KeyValueBackend> = match RedisBackend::connect(redis).await? {
            Some(redis) => Arc::new(redis),
            None => {
                info!("No Redis URL configured; using the local cache tier only");
                Arc::new(NullBackend)
            }
        };

        Ok(Self::from_config(cache, backend))
    }

    /// Sets the TTL used when `set` is given none.
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// The namespace prefix.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    /// Looks up `key`. Failures and undecodable payloads count as misses.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = self.namespaced(key);

        if self.backend.is_available() {
            match self.backend.get(&full_key).await {
                Ok(Some(json)) => match serde_json::from_str(&json) {
                    Ok(value) => {
                        debug!("Cache hit for key '{}' ({})", full_key, DISTRIBUTED);
                        CacheMetrics::hit(DISTRIBUTED);
                        return Some(value);
                    }
                    Err(e) => {
                        warn!(key = %full_key, error = %e, "Discarding undecodable distributed cache entry");
                    }
                },
                Ok(None) => CacheMetrics::miss(DISTRIBUTED),
                Err(e) => {
                    debug!(key = %full_key, error = %e, "Distributed tier read failed; trying local tier");
                }
            }
        }

        let local = self.local.as_ref()?;
        let Some(json) = local.get(&full_key) else {
            debug!("Cache miss for key '{}'", full_key);
            CacheMetrics::miss(LOCAL);
            return None;
        };

        match serde_json::from_str(&json) {
            Ok(value) => {
                debug!("Cache hit for key '{}' ({})", full_key, LOCAL);
                CacheMetrics::hit(LOCAL);
                Some(value)
            }
            Err(e) => {
                warn!(key = %full_key, error = %e, "Discarding undecodable local cache entry");
                local.delete(&full_key);
                None
            }
        }
    }

    /// Stores `value` under `key` for `ttl` (or the default TTL).
    ///
    /// Distributed-tier failures are logged and absorbed. Only a value that
    /// cannot be serialized is an error.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> FairwayResult<()> {
        let full_key = self.namespaced(key);
        let ttl = ttl.unwrap_or(self.default_ttl);
        let json = serde_json::to_string(value)?;

        if self.backend.is_available() {
            if let Err(e) = self.backend.set_ex(&full_key, &json, ttl).await {
                warn!(key = %full_key, error = %e, "Distributed cache write failed; keeping local copy");
            }
        }

        if let Some(local) = &self.local {
            local.set(&full_key, json, ttl);
        }

        debug!("Cached key '{}' with TTL {:?}", full_key, ttl);
        Ok(())
    }

    /// Removes `key` from both tiers.
    pub async fn delete(&self, key: &str) {
        let full_key = self.namespaced(key);

        if self.backend.is_available() {
            if let Err(e) = self.backend.delete(&full_key).await {
                warn!(key = %full_key, error = %e, "Distributed cache delete failed");
            }
        }

        if let Some(local) = &self.local {
            local.delete(&full_key);
        }
    }

    /// Removes every key matching `pattern` (relative to the namespace) from
    /// both tiers, or everything in the namespace when `pattern` is `None`.
    ///
    /// Returns the number of local entries removed.
    pub async fn clear(&self, pattern: Option<&str>) -> FairwayResult<usize> {
        let full_pattern = self.namespaced(pattern.unwrap_or("*"));
        let compiled = KeyPattern::new(&full_pattern)?;

        if self.backend.is_available() {
            match self.backend.delete_pattern(&full_pattern).await {
                Ok(deleted) => debug!("Cleared {} distributed keys matching '{}'", deleted, full_pattern),
                Err(e) => warn!(pattern = %full_pattern, error = %e, "Distributed cache clear failed"),
            }
        }

        let removed = self
            .local
            .as_ref()
            .map_or(0, |local| local.delete_matching(&compiled));

        info!("Cleared cache entries matching '{}'", full_pattern);
        Ok(removed)
    }

    /// Returns the cached value for `key` or computes, caches and returns it.
    ///
    /// A factory error is returned to the caller and nothing is cached.
    pub async fn get_or_set<T, F, Fut>(&self, key: &str, ttl: Duration, factory: F) -> FairwayResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = FairwayResult<T>>,
    {
        if let Some(cached) = self.get::<T>(key).await {
            return Ok(cached);
        }

        let value = factory().await?;

        if let Err(e) = self.set(key, &value, Some(ttl)).await {
            warn!(key, error = %e, "Failed to cache computed value");
        }

        Ok(value)
    }

    /// Operational snapshot.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let (local_entries, local_memory_bytes) = self
            .local
            .as_ref()
            .map_or((0, 0), |local| (local.len(), local.memory_footprint()));

        CacheStats {
            backend: self.backend.name().to_string(),
            redis_available: self.backend.is_available(),
            local_entries,
            local_memory_bytes,
        }
    }

    /// Sweeps expired local entries. Returns the count removed.
    pub fn cleanup(&self) -> usize {
        let removed = self.local.as_ref().map_or(0, MemoryTier::cleanup);
        if removed > 0 {
            debug!("Removed {} expired local cache entries", removed);
            CacheMetrics::evicted(removed);
        }
        removed
    }

    /// One maintenance pass: sweep the local tier and re-probe a distributed
    /// tier currently marked unavailable.
    pub async fn maintain(&self) -> usize {
        let removed = self.cleanup();

        if !self.backend.is_available() && self.backend.probe().await {
            info!(backend = self.backend.name(), "Distributed cache tier recovered");
        }

        let stats = self.stats();
        CacheMetrics::snapshot(stats.local_entries, stats.redis_available);
        removed
    }

    /// Runs [`maintain`](Self::maintain) every `period` until `shutdown` fires.
    pub fn spawn_maintenance(
        self: &Arc<Self>,
        period: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);

        tokio::spawn(async move {
            info!(namespace = %store.namespace, period_secs = period.as_secs(), "Starting cache maintenance");
            let mut ticker = interval(period);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown.recv() => {
                        info!(namespace = %store.namespace, "Cache maintenance stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        store.maintain().await;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockKeyValueBackend;
    use fairway_core::FairwayError;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Distributed tier held in a map, with a switch to simulate outages.
    #[derive(Default)]
    struct MapBackend {
        data: Mutex<HashMap<String, String>>,
        down: AtomicBool,
    }

    #[async_trait::async_trait]
    impl KeyValueBackend for MapBackend {
        fn name(&self) -> &'static str {
            "map"
        }

        fn is_available(&self) -> bool {
            !self.down.load(Ordering::SeqCst)
        }

        async fn probe(&self) -> bool {
            self.is_available()
        }

        async fn get(&self, key: &str) -> FairwayResult<Option<String>> {
            Ok(self.data.lock().get(key).cloned())
        }

        async fn set_ex(&self, key: &str, value: &str, _ttl: Duration) -> FairwayResult<()> {
            self.data.lock().insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> FairwayResult<bool> {
            Ok(self.data.lock().remove(key).is_some())
        }

        async fn delete_pattern(&self, pattern: &str) -> FairwayResult<u64> {
            let compiled = KeyPattern::new(pattern)?;
            let mut data = self.data.lock();
            let before = data.len();
            data.retain(|k, _| !compiled.matches(k));
            Ok((before - data.len()) as u64)
        }
    }

    fn failing_backend() -> MockKeyValueBackend {
        let mut mock = MockKeyValueBackend::new();
        mock.expect_name().return_const("mock");
        mock.expect_is_available().return_const(true);
        mock.expect_probe().returning(|| false);
        mock.expect_get()
            .returning(|_| Err(FairwayError::Cache("connection reset".into())));
        mock.expect_set_ex()
            .returning(|_, _, _| Err(FairwayError::Cache("connection reset".into())));
        mock.expect_delete()
            .returning(|_| Err(FairwayError::Cache("connection reset".into())));
        mock.expect_delete_pattern()
            .returning(|_| Err(FairwayError::Cache("connection reset".into())));
        mock
    }

    #[tokio::test]
    async fn test_set_then_get_distributed_tier() {
        let backend = Arc::new(MapBackend::default());
        let store = TieredCacheStore::new("ns", backend.clone());

        store.set("k", &vec![1, 2, 3], None).await.unwrap();

        assert!(backend.data.lock().contains_key("ns:k"));
        assert_eq!(store.get::<Vec<i32>>("k").await, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_set_then_get_local_tier_only() {
        let store = TieredCacheStore::new("ns", Arc::new(NullBackend));

        store.set("k", "value", Some(Duration::from_secs(5))).await.unwrap();

        assert_eq!(store.get::<String>("k").await.as_deref(), Some("value"));
        let stats = store.stats();
        assert!(!stats.redis_available);
        assert_eq!(stats.local_entries, 1);
        assert!(stats.local_memory_bytes > 0);
    }

    #[tokio::test]
    async fn test_distributed_outage_degrades_to_local_tier() {
        let store = TieredCacheStore::new("ns", Arc::new(failing_backend()));

        store.set("k", &42_u32, None).await.unwrap();
        assert_eq!(store.get::<u32>("k").await, Some(42));

        store.delete("k").await;
        assert_eq!(store.get::<u32>("k").await, None);
    }

    #[tokio::test]
    async fn test_unavailable_backend_is_not_contacted() {
        let mut mock = MockKeyValueBackend::new();
        mock.expect_name().return_const("mock");
        mock.expect_is_available().return_const(false);
        mock.expect_get().never();
        mock.expect_set_ex().never();

        let store = TieredCacheStore::new("ns", Arc::new(mock));
        store.set("k", "v", None).await.unwrap();
        assert_eq!(store.get::<String>("k").await.as_deref(), Some("v"));
        assert!(!store.stats().redis_available);
    }

    #[tokio::test]
    async fn test_local_tier_serves_when_distributed_goes_down() {
        let backend = Arc::new(MapBackend::default());
        let store = TieredCacheStore::new("ns", backend.clone());

        store.set("k", "v", None).await.unwrap();
        backend.down.store(true, Ordering::SeqCst);

        assert_eq!(store.get::<String>("k").await.as_deref(), Some("v"));
        assert!(!store.stats().redis_available);
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_entry_expires() {
        let store = TieredCacheStore::new("ns", Arc::new(NullBackend));
        store.set("live", &1, Some(Duration::from_secs(30))).await.unwrap();

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(store.get::<i32>("live").await, None);
        assert_eq!(store.stats().local_entries, 0);
    }

    #[tokio::test]
    async fn test_clear_with_pattern_and_namespace() {
        let backend = Arc::new(MapBackend::default());
        backend
            .data
            .lock()
            .insert("other:rankings:x".to_string(), "1".to_string());
        let store = TieredCacheStore::new("ns", backend.clone());

        store.set("rankings:a", &1, None).await.unwrap();
        store.set("rankings:b", &2, None).await.unwrap();
        store.set("golfer:1", &3, None).await.unwrap();

        assert_eq!(store.clear(Some("rankings:*")).await.unwrap(), 2);
        assert_eq!(store.get::<i32>("rankings:a").await, None);
        assert_eq!(store.get::<i32>("golfer:1").await, Some(3));

        assert_eq!(store.clear(None).await.unwrap(), 1);
        assert_eq!(store.get::<i32>("golfer:1").await, None);
        assert!(backend.data.lock().contains_key("other:rankings:x"));
    }

    #[tokio::test]
    async fn test_clear_survives_backend_failure() {
        let store = TieredCacheStore::new("ns", Arc::new(failing_backend()));
        store.set("a", &1, None).await.unwrap();
        assert_eq!(store.clear(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_or_set_computes_once() {
        let store = TieredCacheStore::new("ns", Arc::new(NullBackend));
        let calls = std::sync::atomic::AtomicU32::new(0);

        for _ in 0..3 {
            let value = store
                .get_or_set("k", Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7_u8)
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_set_does_not_cache_errors() {
        let store = TieredCacheStore::new("ns", Arc::new(NullBackend));

        let result: FairwayResult<u8> = store
            .get_or_set("k", Duration::from_secs(60), || async {
                Err(FairwayError::Network("down".into()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.stats().local_entries, 0);
    }

    #[tokio::test]
    async fn test_disabled_local_tier() {
        let config = CacheConfig {
            memory_fallback: false,
            ..CacheConfig::default()
        };
        let store = TieredCacheStore::from_config(&config, Arc::new(NullBackend));

        store.set("k", &1, None).await.unwrap();
        assert_eq!(store.get::<i32>("k").await, None);
        assert_eq!(store.namespace(), "fairway:golf");
    }

    #[tokio::test]
    async fn test_maintain_reprobes_unavailable_backend() {
        let backend = Arc::new(MapBackend::default());
        backend.down.store(true, Ordering::SeqCst);
        let store = TieredCacheStore::new("ns", backend.clone());

        store.maintain().await;
        assert!(!store.stats().redis_available);

        backend.down.store(false, Ordering::SeqCst);
        store.maintain().await;
        assert!(store.stats().redis_available);
    }

    #[tokio::test(start_paused = true)]
    async fn test_maintenance_task_sweeps_and_stops() {
        let store = Arc::new(TieredCacheStore::new("ns", Arc::new(NullBackend)));
        store.set("k", &1, Some(Duration::from_secs(10))).await.unwrap();

        let (tx, rx) = broadcast::channel(1);
        let handle = store.spawn_maintenance(Duration::from_secs(300), rx);

        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(store.stats().local_entries, 0);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
