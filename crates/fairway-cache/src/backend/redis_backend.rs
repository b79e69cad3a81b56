//! Redis backend for the distributed tier.

use super::KeyValueBackend;
use crate::metrics::CacheMetrics;
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use fairway_config::RedisConfig;
use fairway_core::{FairwayError, FairwayResult};
use fairway_resilience::with_timeout;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Creates a Redis connection pool from configuration.
///
/// Returns `Ok(None)` when no connection string is configured. Building the
/// pool does not connect; reachability is established by
/// [`RedisBackend::probe`].
pub fn create_pool(config: &RedisConfig) -> FairwayResult<Option<Pool>> {
    let Some(url) = config.connection_url()? else {
        return Ok(None);
    };

    info!("Creating Redis connection pool for the cache store...");

    let pool = Config::from_url(url)
        .builder()
        .map_err(|e| FairwayError::Configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| FairwayError::Configuration(format!("Failed to create pool: {}", e)))?;

    Ok(Some(pool))
}

/// Redis-backed distributed tier.
///
/// Every command is bounded by the configured command timeout. Success
/// marks the backend available; any pool or command error marks it
/// unavailable until the next successful round trip or probe.
pub struct RedisBackend {
    pool: Pool,
    available: AtomicBool,
    command_timeout: Duration,
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("available", &self.is_available())
            .field("command_timeout", &self.command_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisBackend {
    /// Wraps a pool. The backend starts unavailable until probed.
    #[must_use]
    pub fn new(pool: Pool, command_timeout: Duration) -> Self {
        Self {
            pool,
            available: AtomicBool::new(false),
            command_timeout,
        }
    }

    /// Builds the backend from configuration and runs the startup probe.
    ///
    /// Returns `Ok(None)` when Redis is not configured. An unreachable
    /// server is not an error; the backend is returned marked unavailable.
    pub async fn connect(config: &RedisConfig) -> FairwayResult<Option<Self>> {
        let Some(pool) = create_pool(config)? else {
            return Ok(None);
        };

        let backend = Self::new(pool, config.command_timeout());
        if backend.probe().await {
            info!("Redis cache tier is reachable");
        } else {
            warn!("Redis cache tier is unreachable at startup; serving from the local tier");
        }

        Ok(Some(backend))
    }

    async fn get_conn(&self) -> FairwayResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| FairwayError::Cache(format!("Failed to get Redis connection: {}", e)))
    }

    /// Runs one command under the timeout and records the outcome in the
    /// availability flag.
    async fn run<T, F, Fut>(&self, operation: &'static str, f: F) -> FairwayResult<T>
    where
        F: FnOnce(deadpool_redis::Connection) -> Fut,
        Fut: Future<Output = FairwayResult<T>>,
    {
        let result = with_timeout(self.command_timeout, || async {
            let conn = self.get_conn().await?;
            f(conn).await
        })
        .await;

        match &result {
            Ok(_) => self.mark(true),
            Err(e) => {
                warn!(operation, error = %e, "Redis command failed");
                CacheMetrics::backend_error(operation);
                self.mark(false);
            }
        }

        result
    }

    fn mark(&self, available: bool) {
        let previous = self.available.swap(available, Ordering::SeqCst);
        if previous != available {
            if available {
                info!("Redis cache tier became available");
            } else {
                warn!("Redis cache tier became unavailable");
            }
        }
    }
}

#[async_trait]
impl KeyValueBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn probe(&self) -> bool {
        self.run("ping", |mut conn| async move {
            deadpool_redis::redis::cmd("PING")
                .query_async::<String>(&mut *conn)
                .await
                .map_err(|e| FairwayError::Cache(format!("PING failed: {}", e)))
        })
        .await
        .is_ok()
    }

    async fn get(&self, key: &str) -> FairwayResult<Option<String>> {
        self.run("get", |mut conn| async move {
            conn.get::<_, Option<String>>(key)
                .await
                .map_err(|e| FairwayError::Cache(format!("Failed to get key '{}': {}", key, e)))
        })
        .await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> FairwayResult<()> {
        let ttl_secs = ttl.as_secs().max(1);

        self.run("set", |mut conn| async move {
            conn.set_ex::<_, _, ()>(key, value, ttl_secs)
                .await
                .map_err(|e| FairwayError::Cache(format!("Failed to set key '{}': {}", key, e)))
        })
        .await?;

        debug!("Cached key '{}' in Redis with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> FairwayResult<bool> {
        let deleted: i64 = self
            .run("delete", |mut conn| async move {
                conn.del(key)
                    .await
                    .map_err(|e| FairwayError::Cache(format!("Failed to delete key '{}': {}", key, e)))
            })
            .await?;

        Ok(deleted > 0)
    }

    async fn delete_pattern(&self, pattern: &str) -> FairwayResult<u64> {
        let deleted = self
            .run("delete_pattern", |mut conn| async move {
                // KEYS is O(n) over the keyspace.
                let keys: Vec<String> = deadpool_redis::redis::cmd("KEYS")
                    .arg(pattern)
                    .query_async(&mut *conn)
                    .await
                    .map_err(|e| FairwayError::Cache(format!("Failed to scan keys: {}", e)))?;

                if keys.is_empty() {
                    return Ok(0);
                }

                let deleted: i64 = conn
                    .del(&keys)
                    .await
                    .map_err(|e| FairwayError::Cache(format!("Failed to delete keys: {}", e)))?;
                Ok(u64::try_from(deleted).unwrap_or(0))
            })
            .await?;

        debug!("Deleted {} Redis keys matching pattern '{}'", deleted, pattern);
        Ok(deleted)
    }
}
