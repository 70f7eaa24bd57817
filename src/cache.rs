use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use crate::clock::{Clock, SystemClock};

/// Default lifetime of a cached conversion.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// A cached conversion and the moment it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub value: T,
    pub created_at: DateTime<Utc>,
}

// ---------- CONVERSION CACHE ----------

/// Time-bounded memo of conversions keyed by `YYYY-MM-DD`.
///
/// One instance per calendar system. Entries never get evicted for size;
/// they only stop being served once `ttl` has passed.
pub struct ConversionCache<T> {
    entries: Mutex<LruCache<String, CacheEntry<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> ConversionCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
            ttl,
            clock,
        }
    }

    /// Returns the entry only while it is younger than the ttl.
    pub fn get(&self, key: &str) -> Option<CacheEntry<T>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if now - entry.created_at < self.ttl => Some(entry.clone()),
            Some(_) => {
                debug!(target: "cache", "Entry for {} expired", key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` stamped with the current time, replacing any prior entry.
    pub fn put(&self, key: impl Into<String>, value: T) {
        let entry = CacheEntry {
            value,
            created_at: self.clock.now(),
        };
        self.entries.lock().put(key.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<T: Clone> Default for ConversionCache<T> {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_TTL_HOURS), Arc::new(SystemClock))
    }
}
