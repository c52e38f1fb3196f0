//! In-memory cache with per-entry expiry.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Default time-to-live for cached entries (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default interval between background cleanup passes (1 minute).
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Shortest interval accepted by [`TtlCache::spawn_cleanup`].
const MIN_CLEANUP_INTERVAL: Duration = Duration::from_millis(1);

/// A single cached value and its lifetime.
#[derive(Debug)]
struct CacheEntry<V> {
    /// Cached value.
    value: V,
    /// When the value was stored.
    inserted_at: Instant,
    /// How long the value stays fresh.
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// An entry expires once strictly more than `ttl` has elapsed.
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) > self.ttl
    }
}

/// Snapshot of the cache contents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct CacheStats {
    /// Number of stored entries, expired ones included.
    pub size: usize,
    /// Stored keys in no particular order.
    pub keys: Vec<String>,
}

/// Key-value cache where every entry carries its own expiry.
///
/// Expired entries are evicted lazily by [`TtlCache::get`] and in bulk by
/// [`TtlCache::cleanup`]. There is no size bound and no LRU ordering.
///
/// Clones share the same store.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TtlCache<V> {
    /// Shared entry map.
    entries: Arc<Mutex<HashMap<String, CacheEntry<V>>>>,
    /// TTL applied by [`TtlCache::set`].
    default_ttl: Duration,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            default_ttl: self.default_ttl,
        }
    }
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V> TtlCache<V> {
    /// Creates an empty cache using `default_ttl` for [`TtlCache::set`].
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            default_ttl,
        }
    }

    /// Returns the TTL applied by [`TtlCache::set`].
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Stores `value` under `key` with the default TTL, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Stores `value` under `key` with an explicit TTL.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
            ttl,
        };
        self.entries.lock().insert(key.into(), entry);
    }

    /// Returns a copy of the value for `key`.
    ///
    /// An expired entry is removed and reported as missing.
    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let mut entries = self.entries.lock();
        let expired = entries.get(key)?.is_expired(Instant::now());
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    /// Returns `true` when `key` is present and fresh. Does not evict.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .get(key)
            .is_some_and(|entry| !entry.is_expired(Instant::now()))
    }

    /// Removes `key`. Returns whether an entry was present.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Removes every entry whose key contains `pattern`.
    ///
    /// Returns the number of removed entries.
    pub fn delete_matching(&self, pattern: &str) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.contains(pattern));
        before.saturating_sub(entries.len())
    }

    /// Removes every expired entry. Returns the number of removed entries.
    pub fn cleanup(&self) -> usize {
        purge_expired(&mut self.entries.lock())
    }

    /// Returns the current size and keys.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            size: entries.len(),
            keys: entries.keys().cloned().collect(),
        }
    }

    /// Spawns a tokio task that runs [`TtlCache::cleanup`] every `interval`.
    ///
    /// The task ends on its own once every handle to the cache is dropped.
    /// Intervals shorter than 1 ms are raised to 1 ms.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn spawn_cleanup(&self, interval: Duration) -> JoinHandle<()>
    where
        V: Send + 'static,
    {
        let weak: Weak<Mutex<HashMap<String, CacheEntry<V>>>> = Arc::downgrade(&self.entries);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(MIN_CLEANUP_INTERVAL));
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(entries) = weak.upgrade() else {
                    break;
                };
                let removed = purge_expired(&mut entries.lock());
                if removed > 0 {
                    tracing::debug!(removed, "expired cache entries purged");
                }
            }
        })
    }
}

/// Drops expired entries from `entries`, returning how many were removed.
fn purge_expired<V>(entries: &mut HashMap<String, CacheEntry<V>>) -> usize {
    let now = Instant::now();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before.saturating_sub(entries.len())
}
