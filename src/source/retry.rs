//! Retry with a fixed backoff multiplier.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// How many times to retry a failed fetch and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Factor applied to the delay after every retry.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            initial_delay: Duration::from_millis(500),
            multiplier: 1.5,
        }
    }
}

impl RetryPolicy {
    /// A policy that gives up after the first failure.
    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            retries: 0,
            ..Self::default()
        }
    }

    /// The delay that follows `delay`.
    pub fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_millis((delay.as_millis() as f64 * self.multiplier) as u64)
    }

    /// The first `count` delays, in order.
    #[cfg(test)]
    pub fn delays(&self, count: usize) -> Vec<Duration> {
        std::iter::successors(Some(self.initial_delay), |d| Some(self.next_delay(*d)))
            .take(count.min(self.retries as usize))
            .collect()
    }

    /// Run `op` until it succeeds or the retries are exhausted.
    ///
    /// The error of the last attempt is returned.
    pub async fn run<F, Fut, T, E>(&self, what: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut delay = self.initial_delay;
        let mut retried: u32 = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if retried < self.retries => {
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                        what,
                        u64::from(retried) + 1,
                        u64::from(self.retries) + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    delay = self.next_delay(delay);
                    retried += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
