//! Resilient page fetcher
//!
//! Wraps a [`Transport`] with the run's retry policy:
//! - a random politeness delay before every attempt
//! - up to `max_retries` attempts per request
//! - exponential backoff (`base_delay * 2^attempt`) between failed attempts,
//!   never after the last one
//!
//! The fetcher owns its transport, so dropping it releases the HTTP session.

use crate::config::FetchConfig;
use crate::crawler::transport::Transport;
use crate::{FetchError, SweepError};
use rand::Rng;
use reqwest::header::HeaderMap;
use std::time::Duration;

/// Retry and politeness settings, shared read-only by every fetch in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per request, including the first
    pub max_retries: u32,

    /// Backoff base; doubled for every further attempt
    pub base_delay: Duration,

    pub jitter_min: Duration,

    pub jitter_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            jitter_min: Duration::from_millis(config.jitter_min_ms),
            jitter_max: Duration::from_millis(config.jitter_max_ms),
        }
    }

    /// Wait after failed attempt `attempt` (0-indexed)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.checked_mul(factor).unwrap_or(Duration::MAX)
    }

    /// Uniform random delay in `[jitter_min, jitter_max]`
    pub fn politeness_delay(&self) -> Duration {
        if self.jitter_max <= self.jitter_min {
            return self.jitter_min;
        }
        rand::thread_rng().gen_range(self.jitter_min..=self.jitter_max)
    }
}

/// Issues GET requests with pacing and bounded retries
pub struct Fetcher<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches a URL, returning the body of the first successful response
    pub async fn fetch(&self, url: &str) -> Result<String, SweepError> {
        self.fetch_with_headers(url, None).await
    }

    /// Like [`Fetcher::fetch`], with extra request headers
    ///
    /// # Errors
    ///
    /// `SweepError::FetchExhausted` carrying the last attempt's error once
    /// every attempt has failed.
    pub async fn fetch_with_headers(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<String, SweepError> {
        let attempts = self.policy.max_retries;
        let mut last_error = None;

        for attempt in 0..attempts {
            tokio::time::sleep(self.policy.politeness_delay()).await;

            match self.transport.get(url, headers).await {
                Ok(body) => {
                    if attempt > 0 {
                        tracing::debug!("Fetched {} on attempt {}", url, attempt + 1);
                    }
                    return Ok(body);
                }
                Err(e) => {
                    tracing::debug!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt + 1,
                        attempts,
                        url,
                        e
                    );
                    last_error = Some(e);

                    if attempt + 1 < attempts {
                        let wait = self.policy.backoff_delay(attempt);
                        tracing::trace!("Backing off {:?} before retrying {}", wait, url);
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        Err(SweepError::FetchExhausted {
            url: url.to_string(),
            attempts,
            last: last_error
                .unwrap_or_else(|| FetchError::Transport("no attempts configured".to_string())),
        })
    }
}
