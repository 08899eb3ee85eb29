//! Analytics core: cache-first retrieval, anomaly detection, and
//! dashboard aggregation over per-city air-quality readings.

pub mod aggregator;
pub mod cache;
pub mod chain;
pub mod detector;
pub mod predictions;

pub use cache::{new_reading_cache, normalize_city, CachedReading, ReadingCache};
pub use chain::{ReadingProvider, ReadingStore, RetrievalChain};
pub use detector::{detect, InsightBuffer};
pub use predictions::{prediction_for, Prediction, PredictionKind};
