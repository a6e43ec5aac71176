//! In-memory TTL cache for fetched request payloads.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Cache entry with TTL.
#[derive(Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// An entry is valid strictly before `stored_at + ttl`, so a zero TTL
    /// is expired from the moment it is stored.
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() >= self.ttl
    }

    fn remaining(&self) -> Option<Duration> {
        self.ttl.checked_sub(self.stored_at.elapsed())
            .filter(|left| !left.is_zero())
    }
}

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL applied by [`RequestCache::set`] when none is given explicitly
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(5 * 60),
        }
    }
}

/// In-memory cache for request payloads.
///
/// Thread-safe and supports TTL-based expiration. Expired entries are
/// evicted lazily by the reads that observe them; there is no background
/// sweeper, though [`cleanup_expired`](Self::cleanup_expired) lets callers
/// reclaim memory on their own schedule.
pub struct RequestCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    config: CacheConfig,
}

impl RequestCache {
    /// Creates a new cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Returns the process-wide shared cache.
    ///
    /// Sessions that are not handed an explicit store all read and write
    /// through this one, so any consumer can invalidate entries for all of
    /// them. Tests should construct their own stores instead.
    pub fn shared() -> Arc<RequestCache> {
        static SHARED: Lazy<Arc<RequestCache>> = Lazy::new(|| Arc::new(RequestCache::new()));
        Arc::clone(&SHARED)
    }

    /// Gets a cached payload by key, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Caches a payload with the default TTL.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.set_with_ttl(key, value, self.config.default_ttl);
    }

    /// Caches a payload with a custom TTL, replacing any previous entry
    /// under the same key.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let mut entries = self.entries.write();
        entries.insert(
            key.into(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Returns true if a valid entry exists, evicting it if it has expired.
    pub fn has(&self, key: &str) -> bool {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Removes a cached entry. Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Clears all cached entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Returns a snapshot of all keys currently stored.
    ///
    /// The snapshot may include expired entries that no read has evicted yet.
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Returns the time left before the entry under `key` expires.
    ///
    /// `None` for absent or already expired entries. Unlike [`get`](Self::get)
    /// this is a pure read and never evicts.
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        self.entries.read().get(key).and_then(|e| e.remaining())
    }

    /// Removes every entry whose key starts with `prefix` and returns how
    /// many were dropped.
    ///
    /// Cache keys start with the request URL, so passing an endpoint URL
    /// invalidates that endpoint across all option variants.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write();
        let doomed: Vec<String> = entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        for key in &doomed {
            debug!(key = %key, "invalidating cache entry");
            entries.remove(key);
        }
        doomed.len()
    }

    /// Removes all expired entries.
    pub fn cleanup_expired(&self) {
        self.entries.write().retain(|_, e| !e.is_expired());
    }

    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired()).count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
        }
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Clone, Debug)]
pub struct CacheStats {
    /// Entries currently stored, expired ones included
    pub total_entries: usize,
    /// Stored entries that have already expired
    pub expired_entries: usize,
    /// Stored entries still valid
    pub valid_entries: usize,
}
