//! In-memory TTL cache store.
//!
//! Provides async cache operations with JSON serialization for cached values.
//! Entries expire lazily on read; a background sweeper bounds memory by
//! evicting expired entries even when nothing reads them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, instrument};

/// A single cached value with its expiry bookkeeping.
struct Entry {
    payload: String,
    stored_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) > self.ttl
    }
}

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Concurrent in-process cache keyed by string, holding JSON payloads.
///
/// Cloning is cheap and all clones share the same backing map. The cache
/// owns an optional background sweeper task; the owner that started it is
/// responsible for calling [`MemoryCache::stop_sweeper`] on shutdown.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    default_ttl: Duration,
    sweeper: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl MemoryCache {
    /// Creates a new cache with the given default time-to-live.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
            sweeper: Arc::new(Mutex::new(None)),
        }
    }

    /// Gets a cached value by key.
    ///
    /// Returns `None` if the key doesn't exist, the entry has outlived its
    /// TTL (expired entries are evicted on access), or deserialization fails.
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    debug!(cache.key = %key, "Cache hit");
                    return match serde_json::from_str(&entry.payload) {
                        Ok(parsed) => Some(parsed),
                        Err(e) => {
                            error!(cache.key = %key, error = %e, "Failed to deserialize cached value");
                            None
                        }
                    };
                }
                Some(_) => {}
                None => {
                    debug!(cache.key = %key, "Cache miss");
                    return None;
                }
            }
        }

        // Lazy expiry: drop the stale entry under a write lock, re-checking
        // in case a concurrent set replaced it since the read above.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key)
            && entry.is_expired(Instant::now())
        {
            entries.remove(key);
        }
        debug!(cache.key = %key, "Cache miss (expired)");
        None
    }

    /// Sets a cached value with the default TTL.
    #[instrument(skip(self, value), fields(cache.operation = "SET"))]
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Sets a cached value with a custom TTL, overwriting any existing entry.
    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    pub async fn set_with_ttl<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let payload = serde_json::to_string(value)?;
        let entry = Entry {
            payload,
            stored_at: Instant::now(),
            ttl,
        };

        self.entries.write().await.insert(key.to_string(), entry);

        debug!(cache.key = %key, cache.ttl_secs = %ttl.as_secs(), "Cache set");

        Ok(())
    }

    /// Invalidates (deletes) a cached key.
    ///
    /// Returns whether an entry was present.
    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    pub async fn invalidate(&self, key: &str) -> bool {
        let removed = self.entries.write().await.remove(key).is_some();

        debug!(cache.key = %key, cache.removed = %removed, "Cache invalidated");

        removed
    }

    /// Invalidates all keys starting with the given prefix.
    ///
    /// Used to drop an entire resource collection after any mutation to
    /// that resource. Returns the number of evicted entries.
    #[instrument(skip(self), fields(cache.operation = "DEL_PREFIX"))]
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();

        debug!(cache.prefix = %prefix, cache.removed = %removed, "Prefix invalidation complete");

        removed
    }

    /// Evicts every expired entry.
    ///
    /// The background sweeper calls this periodically so that entries
    /// nobody reads again still get reclaimed. Returns the eviction count.
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of live (possibly expired but unswept) entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Starts the background sweep task, replacing any previous one.
    pub async fn start_sweeper(&self, interval: Duration) {
        let entries = Arc::clone(&self.entries);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; skip it so the first
            // sweep happens one full interval after startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let now = Instant::now();
                let mut map = entries.write().await;
                let before = map.len();
                map.retain(|_, entry| !entry.is_expired(now));
                let removed = before - map.len();
                drop(map);
                if removed > 0 {
                    debug!(cache.removed = %removed, "Background sweep evicted expired entries");
                }
            }
        });

        if let Some(previous) = self.sweeper.lock().await.replace(handle) {
            previous.abort();
        }
    }

    /// Stops the background sweep task if one is running.
    pub async fn stop_sweeper(&self) {
        if let Some(handle) = self.sweeper.lock().await.take() {
            handle.abort();
        }
    }
}
