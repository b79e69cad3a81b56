//! Rate limiter implementation.

use fairway_core::{FairwayError, RateLimit};
use governor::{
    clock::DefaultClock,
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter for keeping outbound calls inside an upstream budget.
pub struct RateLimiter {
    limiter: Arc<GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Creates a new rate limiter with the specified requests per second.
    pub fn new(requests_per_second: u32) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
        Self::from_quota(quota)
    }

    /// Creates a rate limiter with requests per minute.
    pub fn per_minute(requests: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN));
        Self::from_quota(quota)
    }

    /// Creates a rate limiter matching an advertised provider rate limit.
    ///
    /// The whole budget is available as a burst and replenishes evenly
    /// across the period.
    pub fn from_rate_limit(limit: &RateLimit) -> Self {
        let burst = NonZeroU32::new(limit.requests).unwrap_or(NonZeroU32::MIN);
        let replenish = limit.period.duration() / burst.get();
        let quota = Quota::with_period(replenish)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);
        Self::from_quota(quota)
    }

    fn from_quota(quota: Quota) -> Self {
        Self {
            limiter: Arc::new(GovernorRateLimiter::direct(quota)),
        }
    }

    /// Checks if a request is allowed (non-blocking).
    pub fn check(&self) -> Result<(), FairwayError> {
        self.limiter
            .check()
            .map_err(|_| FairwayError::RateLimitExceeded)
    }

    /// Waits until a request is allowed.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            limiter: Arc::clone(&self.limiter),
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}
