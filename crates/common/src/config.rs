//! Service configuration types.

use serde::{Deserialize, Serialize};

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// DeepSeek API key. Empty means AI endpoints degrade (ai-insights
    /// and ai-chat return upstream errors; predictions stay local).
    #[serde(default)]
    pub deepseek_api_key: String,

    /// DeepSeek model name.
    #[serde(default = "default_model")]
    pub deepseek_model: String,

    /// SQLite database URL for the durable reading cache.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Timing parameters.
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Default number of readings returned by GET /api/air-quality.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

/// Timing configuration (intervals in seconds unless noted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Batch refresh interval.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// LLM insight refresh interval.
    #[serde(default = "default_insight_interval")]
    pub insight_interval_secs: u64,

    /// Memory-tier cache TTL.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Concurrent fetches per fan-out chunk during a batch refresh.
    #[serde(default = "default_batch_width")]
    pub batch_width: usize,

    /// Delay between fan-out chunks (milliseconds).
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// LLM request timeout (milliseconds).
    #[serde(default = "default_llm_timeout_ms")]
    pub llm_timeout_ms: u64,

    /// Max LLM retries on 429/timeout.
    #[serde(default = "default_llm_retries")]
    pub llm_max_retries: u32,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_model() -> String {
    "deepseek-chat".into()
}

fn default_database_url() -> String {
    "sqlite://airwatch.db?mode=rwc".into()
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    3001
}

fn default_limit() -> usize {
    20
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_insight_interval() -> u64 {
    600
}

fn default_cache_ttl() -> u64 {
    1800
}

fn default_batch_width() -> usize {
    4
}

fn default_batch_delay_ms() -> u64 {
    250
}

fn default_llm_timeout_ms() -> u64 {
    30_000
}

fn default_llm_retries() -> u32 {
    2
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_limit: default_limit(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            insight_interval_secs: default_insight_interval(),
            cache_ttl_secs: default_cache_ttl(),
            batch_width: default_batch_width(),
            batch_delay_ms: default_batch_delay_ms(),
            llm_timeout_ms: default_llm_timeout_ms(),
            llm_max_retries: default_llm_retries(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            deepseek_api_key: String::new(),
            deepseek_model: default_model(),
            database_url: default_database_url(),
            server: ServerConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}
