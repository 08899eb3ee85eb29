//! Durable reading cache backed by SQLite.
//!
//! A single insert-only table of serialized readings keyed by city name
//! and cache timestamp. Reads always take the most recent row, so
//! duplicate rows from racing writers are tolerated (last write wins).
//! Rows are never deleted; unbounded growth is an accepted property of
//! this cache, not a recommendation.

use chrono::{DateTime, Utc};
use common::{CityReading, Error, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cached_readings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    city TEXT NOT NULL,
    payload TEXT NOT NULL,
    cached_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cached_readings_city ON cached_readings (city, cached_at DESC);";

#[derive(Debug, FromRow)]
struct CacheRow {
    payload: String,
    cached_at: DateTime<Utc>,
}

/// SQLite-backed store of cached readings.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database and ensure the schema exists.
    pub async fn connect(url: &str) -> Result<Self> {
        // One connection: SQLite serializes writers anyway, and an
        // in-memory URL must not fan out across connections.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|e| Error::Store(format!("connect {}: {}", url, e)))?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| Error::Store(format!("schema init: {}", e)))?;

        Ok(Self { pool })
    }

    /// Insert a reading. Rows are append-only.
    pub async fn insert(&self, reading: &CityReading) -> Result<()> {
        let payload = serde_json::to_string(reading)?;
        sqlx::query("INSERT INTO cached_readings (city, payload, cached_at) VALUES (?1, ?2, ?3)")
            .bind(&reading.city)
            .bind(payload)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Store(format!("insert {}: {}", reading.city, e)))?;

        debug!("Cached reading for {}", reading.city);
        Ok(())
    }

    /// Most recent row whose city fuzzy-matches the requested name:
    /// case-insensitive substring match in either direction.
    pub async fn latest_matching(
        &self,
        name: &str,
    ) -> Result<Option<(CityReading, DateTime<Utc>)>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }

        let row: Option<CacheRow> = sqlx::query_as(
            "SELECT payload, cached_at FROM cached_readings
             WHERE instr(lower(city), ?1) > 0 OR instr(?1, lower(city)) > 0
             ORDER BY cached_at DESC, id DESC
             LIMIT 1",
        )
        .bind(&needle)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("lookup {}: {}", name, e)))?;

        match row {
            Some(r) => {
                let reading: CityReading = serde_json::from_str(&r.payload)?;
                Ok(Some((reading, r.cached_at)))
            }
            None => Ok(None),
        }
    }

    /// Number of cached rows (for heartbeat logging).
    pub async fn row_count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cached_readings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Store(format!("count: {}", e)))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqi_feed::SyntheticFeed;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_exact_lookup() {
        let store = memory_store().await;
        let reading = SyntheticFeed::new().reading_for("Tokyo");
        store.insert(&reading).await.unwrap();

        let (found, _cached_at) = store.latest_matching("Tokyo").await.unwrap().unwrap();
        assert_eq!(found.city, "Tokyo");
        assert_eq!(found.aqi, reading.aqi);
    }

    #[tokio::test]
    async fn test_fuzzy_lookup_both_directions() {
        let store = memory_store().await;
        let reading = SyntheticFeed::new().reading_for("New York");
        store.insert(&reading).await.unwrap();

        // Requested name is a substring of the stored city.
        assert!(store.latest_matching("york").await.unwrap().is_some());
        // Stored city is a substring of the requested name.
        assert!(store
            .latest_matching("NEW YORK, NY")
            .await
            .unwrap()
            .is_some());
        assert!(store.latest_matching("Osaka").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest_row_wins() {
        let store = memory_store().await;
        let feed = SyntheticFeed::new();

        let mut first = feed.reading_for("Delhi");
        first.aqi = 111;
        store.insert(&first).await.unwrap();

        let mut second = feed.reading_for("Delhi");
        second.aqi = 222;
        store.insert(&second).await.unwrap();

        let (found, _) = store.latest_matching("Delhi").await.unwrap().unwrap();
        assert_eq!(found.aqi, 222);
    }

    #[tokio::test]
    async fn test_empty_name_is_a_miss() {
        let store = memory_store().await;
        assert!(store.latest_matching("  ").await.unwrap().is_none());
    }
}
