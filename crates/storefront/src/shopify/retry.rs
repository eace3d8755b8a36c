//! Bounded retry for transient Storefront API failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::{FailureKind, ShopifyError};
use crate::config::ShopifyStorefrontConfig;

/// Upper bound on any single wait, including server-provided `Retry-After`.
const MAX_DELAY: Duration = Duration::from_secs(10);

/// Whether repeating a request can change the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idempotency {
    /// Reads. Any transient failure may be retried.
    Idempotent,
    /// Mutations such as adding a line. Only retried when Shopify is known to
    /// have rejected the request before acting on it, so a line is never added
    /// twice.
    NonIdempotent,
}

/// Retry policy with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy that retries up to `max_retries` times, waiting
    /// `backoff`, `2 * backoff`, `4 * backoff`, ... between attempts.
    #[must_use]
    pub const fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Policy configured for the Shopify client.
    #[must_use]
    pub const fn from_config(config: &ShopifyStorefrontConfig) -> Self {
        Self::new(config.max_retries, config.retry_backoff)
    }

    /// Maximum number of retries after the first attempt.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run `call`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the last error once it is not retryable or the retry budget is
    /// spent.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &'static str,
        idempotency: Idempotency,
        mut call: F,
    ) -> Result<T, ShopifyError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ShopifyError>>,
    {
        let mut attempt = 0;
        loop {
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let retryable = err.kind() == FailureKind::Transient
                && (idempotency == Idempotency::Idempotent || err.rejected_before_processing());
            if !retryable || attempt >= self.max_retries {
                return Err(err);
            }

            attempt += 1;
            let delay = self.delay_for(attempt, &err);
            warn!(
                operation,
                attempt,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "Retrying Shopify request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn delay_for(&self, attempt: u32, err: &ShopifyError) -> Duration {
        let exponential = self
            .backoff
            .saturating_mul(1 << attempt.saturating_sub(1).min(6));
        let delay = err
            .retry_after_secs()
            .map_or(exponential, |secs| exponential.max(Duration::from_secs(secs)));
        delay.min(MAX_DELAY)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(250))
    }
}
