//! Cache metrics.

use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Metric names for the cache store.
pub mod names {
    /// Cache hits, labelled by tier.
    pub const CACHE_HITS_TOTAL: &str = "fairway_cache_hits_total";
    /// Cache misses, labelled by tier.
    pub const CACHE_MISSES_TOTAL: &str = "fairway_cache_misses_total";
    /// Failed distributed-tier commands, labelled by operation.
    pub const BACKEND_ERRORS_TOTAL: &str = "fairway_cache_backend_errors_total";
    /// Expired local entries removed by sweeps or on access.
    pub const EVICTIONS_TOTAL: &str = "fairway_cache_evictions_total";
    /// Current local-tier entry count.
    pub const LOCAL_ENTRIES: &str = "fairway_cache_local_entries";
    /// Distributed tier reachability (1 or 0).
    pub const BACKEND_AVAILABLE: &str = "fairway_cache_backend_available";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::CACHE_HITS_TOTAL, "Total number of cache hits");
    describe_counter!(names::CACHE_MISSES_TOTAL, "Total number of cache misses");
    describe_counter!(
        names::BACKEND_ERRORS_TOTAL,
        "Total number of failed distributed cache commands"
    );
    describe_counter!(
        names::EVICTIONS_TOTAL,
        "Total number of expired local cache entries removed"
    );
    describe_gauge!(names::LOCAL_ENTRIES, "Current number of local cache entries");
    describe_gauge!(
        names::BACKEND_AVAILABLE,
        "Whether the distributed cache tier is reachable (1) or not (0)"
    );
}

/// Cache metrics recorder.
#[derive(Clone)]
pub struct CacheMetrics;

impl CacheMetrics {
    /// Record a hit in `tier`.
    pub fn hit(tier: &'static str) {
        counter!(names::CACHE_HITS_TOTAL, "tier" => tier).increment(1);
    }

    /// Record a miss in `tier`.
    pub fn miss(tier: &'static str) {
        counter!(names::CACHE_MISSES_TOTAL, "tier" => tier).increment(1);
    }

    /// Record a failed distributed-tier command.
    pub fn backend_error(operation: &'static str) {
        counter!(names::BACKEND_ERRORS_TOTAL, "operation" => operation).increment(1);
    }

    /// Record removed expired entries.
    pub fn evicted(count: usize) {
        counter!(names::EVICTIONS_TOTAL).increment(count as u64);
    }

    /// Record the current local-tier size and backend availability.
    pub fn snapshot(local_entries: usize, backend_available: bool) {
        gauge!(names::LOCAL_ENTRIES).set(local_entries as f64);
        gauge!(names::BACKEND_AVAILABLE).set(if backend_available { 1.0 } else { 0.0 });
    }
}
