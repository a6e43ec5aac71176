//! Coordinator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning for the cached-fetch lifecycle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// How long fetched payloads stay fresh in the cache
    pub cache_ttl: Duration,
    /// Revalidate when the host regains foreground focus
    pub revalidate_on_focus: bool,
    /// Revalidate when connectivity is restored
    pub revalidate_on_reconnect: bool,
    /// Window in which a new fetch is suppressed while one is in flight
    pub deduping_interval: Duration,
    /// Maximum automatic retries after a failed attempt
    pub retry_count: u32,
    /// Base delay for exponential retry backoff
    pub retry_delay: Duration,
    /// Fixed deadline for a single attempt; the request is aborted when it
    /// elapses
    pub request_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(5 * 60),
            revalidate_on_focus: true,
            revalidate_on_reconnect: true,
            deduping_interval: Duration::from_secs(2),
            retry_count: 3,
            retry_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl FetchConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cache TTL for fetched payloads.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Enables or disables revalidation on focus.
    pub fn revalidate_on_focus(mut self, enabled: bool) -> Self {
        self.revalidate_on_focus = enabled;
        self
    }

    /// Enables or disables revalidation on reconnect.
    pub fn revalidate_on_reconnect(mut self, enabled: bool) -> Self {
        self.revalidate_on_reconnect = enabled;
        self
    }

    /// Disables both revalidation triggers.
    pub fn no_revalidation(mut self) -> Self {
        self.revalidate_on_focus = false;
        self.revalidate_on_reconnect = false;
        self
    }

    /// Sets the deduplication window.
    pub fn deduping_interval(mut self, interval: Duration) -> Self {
        self.deduping_interval = interval;
        self
    }

    /// Sets the maximum number of automatic retries.
    pub fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Sets the base delay for retry backoff.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the per-attempt deadline.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Backoff delay before retry number `attempt` (zero-based), doubling
    /// per attempt from `retry_delay`.
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}
