//! Resolution caching
//!
//! Memoises `pathname -> outcome` for one route set with LRU eviction, so
//! navigating back and forth between a handful of locations skips the
//! matcher scan. Misses are cached too: "no match" is a valid outcome.
//!
//! The cache knows nothing about route identity; the router clears it
//! whenever its route set changes.

use crate::resolver::Resolution;
use crate::trace_log;
use lru::LruCache;
use std::fmt;
use std::num::NonZeroUsize;

/// Cache performance statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub invalidations: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU memo of resolution outcomes keyed by pathname
pub struct ResolutionCache<T> {
    entries: LruCache<String, Option<Resolution<T>>>,
    stats: CacheStats,
}

impl<T> ResolutionCache<T> {
    pub const DEFAULT_CAPACITY: usize = 128;

    pub fn new() -> Self {
        Self::with_capacity(NonZeroUsize::new(Self::DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Look up a pathname
    ///
    /// The outer `Option` is the cache hit; the inner one is the cached outcome.
    pub fn get(&mut self, pathname: &str) -> Option<Option<Resolution<T>>> {
        if let Some(entry) = self.entries.get(pathname) {
            self.stats.hits += 1;
            trace_log!("Resolution cache hit for '{}'", pathname);
            Some(entry.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("Resolution cache miss for '{}'", pathname);
            None
        }
    }

    pub fn insert(&mut self, pathname: String, outcome: Option<Resolution<T>>) {
        self.entries.push(pathname, outcome);
    }

    pub fn clear(&mut self) {
        trace_log!("Clearing resolution cache");
        self.entries.clear();
        self.stats.invalidations += 1;
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl<T> Default for ResolutionCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ResolutionCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .field("stats", &self.stats)
            .finish()
    }
}
