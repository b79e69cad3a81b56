//! Retry policy implementation.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt::Display;
use std::time::Duration;
use tracing::debug;

/// Suspends the current task between retry attempts.
///
/// Production code sleeps on the tokio timer; tests substitute a recorder
/// so the backoff schedule can be asserted without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Waits for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every delay requested so far, in order.
    #[must_use]
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().push(duration);
    }
}

/// Retry policy configuration.
///
/// Attempt `n` (zero-based) that fails waits `base_delay * multiplier^n`
/// before attempt `n + 1`: 1s, 2s, 4s with the defaults.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Multiplier for exponential backoff.
    pub multiplier: f64,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with the specified number of retries.
    #[must_use]
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Total attempts including the initial one.
    #[must_use]
    pub const fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Calculates the delay that follows failed attempt `attempt`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let millis = self.base_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Runs `operation` until `should_retry` rejects its outcome or the
    /// retry budget is spent, then returns the last outcome unchanged.
    ///
    /// `operation` receives the zero-based attempt number.
    pub async fn run<F, Fut, T, C>(&self, sleeper: &dyn Sleeper, mut operation: F, should_retry: C) -> T
    where
        F: FnMut(u32) -> Fut,
        Fut: std::future::Future<Output = T>,
        C: Fn(&T) -> bool,
    {
        let mut attempt = 0;
        loop {
            let outcome = operation(attempt).await;
            if attempt >= self.max_retries || !should_retry(&outcome) {
                return outcome;
            }

            let delay = self.delay_for_attempt(attempt);
            debug!("Retry attempt {} after {:?}", attempt + 1, delay);
            sleeper.sleep(delay).await;
            attempt += 1;
        }
    }

    /// Executes a fallible function, retrying every error.
    pub async fn execute<F, Fut, T, E>(&self, sleeper: &dyn Sleeper, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run(
            sleeper,
            |attempt| {
                let fut = f();
                async move {
                    let result = fut.await;
                    if let Err(e) = &result {
                        debug!("Attempt {} failed: {}", attempt + 1, e);
                    }
                    result
                }
            },
            Result::is_err,
        )
        .await
    }
}
