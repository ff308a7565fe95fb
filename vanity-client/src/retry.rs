//! Bounded retry with exponential backoff for transport faults
//!
//! Only the caller decides what is retryable. Job-level failures are never
//! passed through here as retryable.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::{ClientError, Result};
use crate::poller::Sleeper;

/// Longest single wait between retries
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Retry settings for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }

    /// A policy that makes exactly one attempt
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry number `retry` (0-based), capped at ten seconds
    pub fn backoff_for(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(retry))
            .min(MAX_BACKOFF)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// retry budget is spent
    pub async fn run<T, F, Fut, S>(
        &self,
        sleeper: &S,
        operation: &str,
        retryable: fn(&ClientError) -> bool,
        mut op: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        S: Sleeper + ?Sized,
    {
        let mut retry = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if retry < self.max_retries && retryable(&e) => {
                    let delay = self.backoff_for(retry);
                    retry += 1;
                    warn!(
                        "{} failed ({}), retry {}/{} in {:?}",
                        operation, e, retry, self.max_retries, delay
                    );
                    sleeper.sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(250))
    }
}
