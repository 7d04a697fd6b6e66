use std::time::Duration;

use replay_logging::{replay_debug, replay_warn};

use crate::{FetchError, FetchOutput, Fetcher};

/// Bounded exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): doubles each time, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Decorates a [`Fetcher`] with [`RetryPolicy`]. Only failures that
/// [`FetchError::is_retryable`] are retried.
#[derive(Debug, Clone)]
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: Fetcher> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait::async_trait]
impl<F: Fetcher> Fetcher for RetryingFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.inner.fetch(url).await {
                Ok(output) => return Ok(output),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    replay_warn!(
                        "fetch.retrying url={} attempt={}/{} backoff_ms={} error={}",
                        url,
                        attempt,
                        max_attempts,
                        delay.as_millis(),
                        err
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Fetch `url`, turning any failure into `None` after logging it. One
/// unreachable page must never abort discovery of the rest.
pub async fn safe_fetch(fetcher: &dyn Fetcher, url: &str) -> Option<FetchOutput> {
    replay_debug!("fetch url={}", url);
    match fetcher.fetch(url).await {
        Ok(output) => Some(output),
        Err(err) => {
            replay_warn!("Failed to fetch {}: {}", url, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::RetryPolicy;

    #[test]
    fn default_backoff_doubles_from_two_seconds_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
        assert_eq!(policy.delay_for(4), Duration::from_secs(10));
        assert_eq!(policy.delay_for(40), Duration::from_secs(10));
    }
}
