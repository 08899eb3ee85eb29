//! In-memory reading cache.
//!
//! Uses `DashMap` for lock-free concurrent access — individual map
//! operations are atomic, which is all the retrieval chain needs.

use common::CityReading;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;

/// A cached reading with staleness tracking.
#[derive(Debug, Clone)]
pub struct CachedReading {
    pub reading: CityReading,
    pub cached_at: Instant,
}

impl CachedReading {
    pub fn is_stale(&self, max_age_secs: u64) -> bool {
        self.cached_at.elapsed().as_secs() > max_age_secs
    }
}

/// Thread-safe reading cache keyed by normalized city name.
pub type ReadingCache = Arc<DashMap<String, CachedReading>>;

/// Create a new empty ReadingCache.
pub fn new_reading_cache() -> ReadingCache {
    Arc::new(DashMap::new())
}

/// Cache key normalization: trimmed, lowercased.
pub fn normalize_city(name: &str) -> String {
    name.trim().to_lowercase()
}
