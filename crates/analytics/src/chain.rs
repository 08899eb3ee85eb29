//! Cache-first retrieval chain.
//!
//! Answers "what is the current reading for city X" with a strict
//! lookup order that short-circuits on the first hit:
//!
//! 1. in-process map (normalized city key, 30-minute TTL)
//! 2. durable cache table (fuzzy name match, newest row)
//! 3. the reading provider, persisted best-effort on the way out
//!
//! Failures in tiers 1-2 degrade to a miss and fall through. There is
//! no request coalescing: concurrent misses for the same city each run
//! the full chain, and duplicate durable rows are tolerated because
//! reads always take the most recent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CityReading, Result};
use std::time::Instant;
use tracing::{debug, warn};

use crate::cache::{new_reading_cache, normalize_city, CachedReading, ReadingCache};

/// Source tags stamped onto readings served from each cache tier.
pub const SOURCE_MEMORY: &str = "MEMORY_CACHE";
pub const SOURCE_DB: &str = "DB_CACHE";

/// Durable tier of the chain.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    async fn latest_matching(&self, name: &str) -> Result<Option<(CityReading, DateTime<Utc>)>>;
    async fn insert(&self, reading: &CityReading) -> Result<()>;
}

#[async_trait]
impl ReadingStore for cache_store::SqliteStore {
    async fn latest_matching(&self, name: &str) -> Result<Option<(CityReading, DateTime<Utc>)>> {
        cache_store::SqliteStore::latest_matching(self, name).await
    }

    async fn insert(&self, reading: &CityReading) -> Result<()> {
        cache_store::SqliteStore::insert(self, reading).await
    }
}

/// Final tier of the chain. Never errors; unknown cities get a
/// default-baseline reading.
pub trait ReadingProvider: Send + Sync {
    fn reading_for(&self, city: &str) -> CityReading;
}

impl ReadingProvider for aqi_feed::SyntheticFeed {
    fn reading_for(&self, city: &str) -> CityReading {
        aqi_feed::SyntheticFeed::reading_for(self, city)
    }
}

/// The retrieval chain over a memory tier, a durable store, and a provider.
pub struct RetrievalChain<S, P> {
    memory: ReadingCache,
    store: S,
    provider: P,
    ttl_secs: u64,
}

impl<S: ReadingStore, P: ReadingProvider> RetrievalChain<S, P> {
    pub fn new(store: S, provider: P, ttl_secs: u64) -> Self {
        Self {
            memory: new_reading_cache(),
            store,
            provider,
            ttl_secs,
        }
    }

    /// Current number of memory-tier entries (for heartbeat logging).
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Fetch the current reading for a city through the chain.
    pub async fn get(&self, city: &str) -> Result<CityReading> {
        let key = normalize_city(city);

        // Tier 1: in-process map.
        if let Some(entry) = self.memory.get(&key) {
            if !entry.is_stale(self.ttl_secs) {
                debug!("{}: memory cache hit", city);
                let mut reading = entry.reading.clone();
                reading.source = SOURCE_MEMORY.into();
                return Ok(reading);
            }
        }

        // Tier 2: durable cache. Any failure here is a miss, not an error.
        match self.store.latest_matching(city).await {
            Ok(Some((mut reading, cached_at))) => {
                debug!("{}: durable cache hit (cached_at={})", city, cached_at);
                reading.source = SOURCE_DB.into();
                self.memory.insert(
                    key,
                    CachedReading {
                        reading: reading.clone(),
                        cached_at: Instant::now(),
                    },
                );
                return Ok(reading);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("{}: durable cache lookup failed, treating as miss: {}", city, e);
            }
        }

        // Tier 3: synthesize fresh. Persisting is best-effort.
        let reading = self.provider.reading_for(city);
        if let Err(e) = self.store.insert(&reading).await {
            warn!("{}: best-effort cache write failed: {}", city, e);
        }
        self.memory.insert(
            key,
            CachedReading {
                reading: reading.clone(),
                cached_at: Instant::now(),
            },
        );
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Error, HealthLevel};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn make_reading(city: &str, aqi: i64) -> CityReading {
        CityReading {
            city: city.into(),
            country: "Testland".into(),
            aqi,
            pm25: 10.0,
            pm10: 20.0,
            no2: 15.0,
            so2: 5.0,
            o3: 30.0,
            co: 0.5,
            lat: 0.0,
            lon: 0.0,
            timestamp: Utc::now(),
            temperature: None,
            humidity: None,
            pressure: None,
            wind_speed: None,
            dominant_pollutant: "pm25".into(),
            health_level: HealthLevel::from_aqi(aqi),
            source: "SYNTHETIC".into(),
        }
    }

    /// Store fake that counts calls and serves an optional fixed row.
    #[derive(Default)]
    struct FakeStore {
        row: Option<CityReading>,
        lookups: AtomicUsize,
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl ReadingStore for FakeStore {
        async fn latest_matching(
            &self,
            _name: &str,
        ) -> Result<Option<(CityReading, DateTime<Utc>)>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.row.clone().map(|r| (r, Utc::now())))
        }

        async fn insert(&self, _reading: &CityReading) -> Result<()> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Store fake whose every operation fails.
    struct BrokenStore;

    #[async_trait]
    impl ReadingStore for BrokenStore {
        async fn latest_matching(
            &self,
            _name: &str,
        ) -> Result<Option<(CityReading, DateTime<Utc>)>> {
            Err(Error::Store("unreachable".into()))
        }

        async fn insert(&self, _reading: &CityReading) -> Result<()> {
            Err(Error::Store("unreachable".into()))
        }
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl ReadingProvider for CountingProvider {
        fn reading_for(&self, city: &str) -> CityReading {
            self.calls.fetch_add(1, Ordering::SeqCst);
            make_reading(city, 80)
        }
    }

    fn counting_provider() -> CountingProvider {
        CountingProvider {
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn test_memory_hit_short_circuits() {
        let chain = RetrievalChain::new(FakeStore::default(), counting_provider(), 1800);

        // First call misses both caches and hits the provider.
        let first = chain.get("Tokyo").await.unwrap();
        assert_eq!(first.source, "SYNTHETIC");
        assert_eq!(chain.store.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(chain.provider.calls.load(Ordering::SeqCst), 1);

        // Second call must not touch the store or the provider.
        let second = chain.get("Tokyo").await.unwrap();
        assert_eq!(second.source, SOURCE_MEMORY);
        assert_eq!(chain.store.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(chain.provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_durable_hit_populates_memory() {
        let store = FakeStore {
            row: Some(make_reading("Delhi", 190)),
            ..Default::default()
        };
        let chain = RetrievalChain::new(store, counting_provider(), 1800);

        let first = chain.get("Delhi").await.unwrap();
        assert_eq!(first.source, SOURCE_DB);
        assert_eq!(first.aqi, 190);
        assert_eq!(chain.provider.calls.load(Ordering::SeqCst), 0);

        let second = chain.get("Delhi").await.unwrap();
        assert_eq!(second.source, SOURCE_MEMORY);
        assert_eq!(chain.store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_provider() {
        let chain = RetrievalChain::new(BrokenStore, counting_provider(), 1800);

        // Lookup and write both fail; the reading still comes back.
        let reading = chain.get("Cairo").await.unwrap();
        assert_eq!(reading.city, "Cairo");
        assert_eq!(chain.provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_memory_entry_falls_through() {
        let chain = RetrievalChain::new(FakeStore::default(), counting_provider(), 1800);

        chain.memory.insert(
            "tokyo".to_string(),
            CachedReading {
                reading: make_reading("Tokyo", 70),
                cached_at: Instant::now() - Duration::from_secs(3600),
            },
        );

        let reading = chain.get("Tokyo").await.unwrap();
        assert_eq!(reading.source, "SYNTHETIC");
        assert_eq!(chain.store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_key_normalization_shares_entries() {
        let chain = RetrievalChain::new(FakeStore::default(), counting_provider(), 1800);

        chain.get("Tokyo").await.unwrap();
        let hit = chain.get("  TOKYO ").await.unwrap();
        assert_eq!(hit.source, SOURCE_MEMORY);
        assert_eq!(chain.provider.calls.load(Ordering::SeqCst), 1);
    }
}
