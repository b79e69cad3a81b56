//! # Fairway Resilience
//!
//! Resilience patterns for outbound calls made by golf-data providers.
//! Provides retry with exponential backoff, timeouts, rate limiting,
//! and a retrying HTTP fetcher built from them.

pub mod fetch;
pub mod rate_limiter;
pub mod retry;
pub mod timeout;

pub use fetch::*;
pub use rate_limiter::*;
pub use retry::*;
pub use timeout::*;
