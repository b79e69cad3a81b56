//! Timeout wrapper for async operations.

use fairway_core::FairwayError;
use std::time::Duration;

/// Wraps an async operation with a deadline.
///
/// Elapsing the deadline drops the in-flight future and yields
/// `FairwayError::Timeout`.
pub async fn with_timeout<F, Fut, T>(duration: Duration, f: F) -> Result<T, FairwayError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, FairwayError>>,
{
    tokio::time::timeout(duration, f())
        .await
        .map_err(|_| FairwayError::Timeout(format!("Operation timed out after {:?}", duration)))?
}
