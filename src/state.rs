//! Shared application state, explicitly constructed at startup and
//! passed by reference to every consumer. No hidden globals.

use std::sync::Arc;

use analytics::{InsightBuffer, RetrievalChain};
use aqi_feed::SyntheticFeed;
use cache_store::SqliteStore;
use common::{AppConfig, CityReading, Result};
use deepseek_client::DeepSeekClient;
use tokio::sync::{Mutex, RwLock};

pub struct AppState {
    pub config: AppConfig,
    /// Cache-first retrieval chain over the durable store and the feed.
    pub chain: RetrievalChain<SqliteStore, SyntheticFeed>,
    /// Durable store handle, kept for heartbeat counters.
    pub store: SqliteStore,
    /// Latest batch of readings, replaced wholesale by the refresh loop.
    pub snapshot: RwLock<Vec<CityReading>>,
    /// Bounded ring buffer of anomaly insights.
    pub anomalies: Mutex<InsightBuffer>,
    /// Latest LLM-generated insight lines (empty until first refresh).
    pub llm_insights: RwLock<Vec<String>>,
    /// Present only when an API key is configured.
    pub llm: Option<DeepSeekClient>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Arc<Self>> {
        let store = SqliteStore::connect(&config.database_url).await?;
        let chain = RetrievalChain::new(
            store.clone(),
            SyntheticFeed::new(),
            config.timing.cache_ttl_secs,
        );

        let llm = if config.deepseek_api_key.trim().is_empty() {
            None
        } else {
            Some(DeepSeekClient::new(
                config.deepseek_api_key.clone(),
                config.deepseek_model.clone(),
                config.timing.llm_timeout_ms,
                config.timing.llm_max_retries,
            ))
        };

        Ok(Arc::new(Self {
            config,
            chain,
            store,
            snapshot: RwLock::new(Vec::new()),
            anomalies: Mutex::new(InsightBuffer::default()),
            llm_insights: RwLock::new(Vec::new()),
            llm,
        }))
    }
}
