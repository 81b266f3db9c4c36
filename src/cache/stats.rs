//! Cache Statistics Module
//!
//! Tracks lookup hits and misses plus the volume of changes applied from
//! the watch stream.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Lock-free counters, updated from readers and the subscriber alike.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    puts_applied: AtomicU64,
    deletes_applied: AtomicU64,
    reconciles: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStatsSnapshot {
    /// Number of successful cache lookups
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Put events applied from the store
    pub puts_applied: u64,
    /// Delete events applied from the store
    pub deletes_applied: u64,
    /// Range reads folded into the cache
    pub reconciles: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStatsSnapshot {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_put(&self) {
        self.puts_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconcile(&self) {
        self.reconciles.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the counters; `total_entries` is supplied by the owning store.
    pub fn snapshot(&self, total_entries: usize) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            puts_applied: self.puts_applied.load(Ordering::Relaxed),
            deletes_applied: self.deletes_applied.load(Ordering::Relaxed),
            reconciles: self.reconciles.load(Ordering::Relaxed),
            total_entries,
        }
    }
}
