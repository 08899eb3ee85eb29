//! Unified error type for airwatch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cache store error: {0}")]
    Store(String),

    #[error("LLM API error: {0}")]
    Llm(String),

    #[error("No data available: {0}")]
    NoData(String),

    #[error("Insufficient data for aggregation")]
    InsufficientData,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
