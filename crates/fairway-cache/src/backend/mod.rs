//! Distributed-tier backends.
//!
//! The tiered store talks to its shared tier through [`KeyValueBackend`].
//! [`RedisBackend`] is used when a connection string is configured and
//! [`NullBackend`] otherwise.

mod redis_backend;

pub use redis_backend::{create_pool, RedisBackend};

use async_trait::async_trait;
use fairway_core::FairwayResult;
use std::time::Duration;

/// Key/value backend for the distributed cache tier.
///
/// Values are serialized JSON payloads. Implementations keep their own
/// availability flag; callers consult [`is_available`](Self::is_available)
/// before issuing a round trip.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Backend name for logging and stats.
    fn name(&self) -> &'static str;

    /// Last known reachability.
    fn is_available(&self) -> bool;

    /// Round-trips to the backend and refreshes the availability flag.
    async fn probe(&self) -> bool;

    /// Returns the raw payload stored under `key`.
    async fn get(&self, key: &str) -> FairwayResult<Option<String>>;

    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> FairwayResult<()>;

    /// Removes `key`. Returns true if it existed.
    async fn delete(&self, key: &str) -> FairwayResult<bool>;

    /// Removes every key matching the glob `pattern`. Returns the count.
    async fn delete_pattern(&self, pattern: &str) -> FairwayResult<u64>;
}

/// Backend used when no distributed tier is configured.
///
/// Always reports unavailable, so the store serves from the local tier only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

#[async_trait]
impl KeyValueBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn probe(&self) -> bool {
        false
    }

    async fn get(&self, _key: &str) -> FairwayResult<Option<String>> {
        Ok(None)
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> FairwayResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> FairwayResult<bool> {
        Ok(false)
    }

    async fn delete_pattern(&self, _pattern: &str) -> FairwayResult<u64> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_backend_is_never_available() {
        let backend = NullBackend;
        assert!(!backend.is_available());
        assert!(!backend.probe().await);
        assert_eq!(backend.get("k").await.unwrap(), None);
        assert_eq!(backend.delete_pattern("*").await.unwrap(), 0);
    }
}
