use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, info};

use directory_shared::constants::DEFAULT_MENU_CACHE_TTL_SECS;

use super::clock::{Clock, SystemClock};
use crate::domain::DisplayMenuItem;

struct CacheEntry {
    forest: Vec<DisplayMenuItem>,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) >= ttl
    }
}

/// Location-keyed cache of assembled menu forests.
///
/// Entries expire lazily: a read past the TTL removes the entry and reports
/// a miss, nothing sweeps in the background. Callers always receive owned
/// copies, so mutating a returned forest never leaks back into the cache.
pub struct MenuCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MenuCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        info!("Initializing menu cache (ttl: {:?})", ttl);
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Copy of the cached forest, or `None` when absent or expired.
    pub fn get(&self, location: &str) -> Option<Vec<DisplayMenuItem>> {
        let now = self.clock.now();
        let Some(entry) = self.entries.get(location) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        if entry.is_expired(now, self.ttl) {
            drop(entry); // Release read lock
            // A concurrent put may have refreshed the entry in between.
            self.entries
                .remove_if(location, |_, entry| entry.is_expired(now, self.ttl));
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("Menu cache entry for '{}' expired", location);
            return None;
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.forest.clone())
    }

    /// Store a copy of `forest`, replacing whatever was cached for `location`.
    pub fn put(&self, location: &str, forest: &[DisplayMenuItem]) {
        let entry = CacheEntry {
            forest: forest.to_vec(),
            stored_at: self.clock.now(),
        };
        self.entries.insert(location.to_string(), entry);
        debug!("Cached {} root menu items for '{}'", forest.len(), location);
    }

    /// Returns whether an entry was actually removed.
    pub fn invalidate(&self, location: &str) -> bool {
        let removed = self.entries.remove(location).is_some();
        if removed {
            debug!("Invalidated menu cache for '{}'", location);
        } else {
            debug!("No menu cache entry to invalidate for '{}'", location);
        }
        removed
    }

    pub fn invalidate_all(&self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        info!("Invalidated all menu cache entries ({} removed)", count);
        count
    }

    /// Drop expired entries now instead of waiting for their next read.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let start_len = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
        let count = start_len.saturating_sub(self.entries.len());

        if count > 0 {
            info!("Purged {} expired menu cache entries", count);
        }

        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> MenuCacheStats {
        MenuCacheStats {
            entries: self.len(),
            ttl_secs: self.ttl.as_secs(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for MenuCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_MENU_CACHE_TTL_SECS))
    }
}

/// Cache statistics
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCacheStats {
    pub entries: usize,
    pub ttl_secs: u64,
    pub hits: u64,
    pub misses: u64,
}
