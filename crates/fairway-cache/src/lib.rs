//! # Fairway Cache
//!
//! Tiered cache-aside store for golf data. A distributed Redis tier is
//! primary; an in-process TTL map serves as fallback so a Redis outage
//! degrades caching instead of failing requests.

pub mod backend;
pub mod keys;
pub mod memory;
pub mod metrics;
pub mod pattern;
pub mod store;

pub use backend::{create_pool, KeyValueBackend, NullBackend, RedisBackend};
pub use memory::MemoryTier;
pub use self::metrics::{register_metrics, CacheMetrics};
pub use pattern::KeyPattern;
pub use store::{CacheStats, TieredCacheStore};
