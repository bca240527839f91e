//! Statistics for the cache.
//!
//! Atomic counters updated by the cache facade. Most counters and the size
//! are updated while the cache lock is held; hits and misses are recorded
//! right after `get` releases it. A snapshot taken while other threads are
//! running may therefore lag the entries it describes by a few operations.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for cache operations.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Gets that returned a value.
    hits: AtomicU64,

    /// Gets for absent or expired keys.
    misses: AtomicU64,

    /// Puts that created a new entry.
    inserts: AtomicU64,

    /// Puts that overwrote an existing entry.
    updates: AtomicU64,

    /// Entries evicted to make room.
    evictions: AtomicU64,

    /// Entries reclaimed after their TTL, lazily or by the sweep.
    expirations: AtomicU64,

    /// Entries removed explicitly.
    removals: AtomicU64,

    /// Current number of entries.
    size: AtomicU64,
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

    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expirations(&self, count: u64) {
        self.expirations.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_size(&self, size: usize) {
        self.size.store(size as u64, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }

    pub fn removals(&self) -> u64 {
        self.removals.load(Ordering::Relaxed)
    }

    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Relaxed)
    }

    /// Hit rate as a percentage (0.0 to 100.0); 0.0 before any get.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            inserts: self.inserts(),
            updates: self.updates(),
            evictions: self.evictions(),
            expirations: self.expirations(),
            removals: self.removals(),
            size: self.size(),
            hit_rate: self.hit_rate(),
        }
    }
}

/// A point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub removals: u64,
    pub size: u64,
    pub hit_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_stats() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits(), 0);
        assert_eq!(stats.misses(), 0);
        assert_eq!(stats.size(), 0);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);

        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert!((stats.hit_rate() - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_snapshot() {
        let stats = CacheStats::new();
        stats.record_insert();
        stats.record_update();
        stats.record_eviction();
        stats.record_expirations(3);
        stats.set_size(7);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.inserts, 1);
        assert_eq!(snapshot.updates, 1);
        assert_eq!(snapshot.evictions, 1);
        assert_eq!(snapshot.expirations, 3);
        assert_eq!(snapshot.size, 7);
    }
}
