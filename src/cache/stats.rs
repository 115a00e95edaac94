//! Cache Statistics Module
//!
//! Tracks hits, misses, evictions, expirations and GC sweeps.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of lookups that returned a value
    pub hits: u64,
    /// Number of lookups that returned nothing (missing or expired)
    pub misses: u64,
    /// Number of entries removed to keep the size bound
    pub evictions: u64,
    /// Number of entries removed because they expired
    pub expirations: u64,
    /// Number of completed GC sweeps
    pub sweeps: u64,
    /// Current number of tracked entries
    pub total_entries: usize,
    /// Time of the most recent GC sweep
    pub last_sweep_at: Option<DateTime<Utc>>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    // == Record Sweep ==
    /// Counts one finished sweep that ran at `at`.
    pub fn record_sweep(&mut self, at: DateTime<Utc>) {
        self.sweeps += 1;
        self.last_sweep_at = Some(at);
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
