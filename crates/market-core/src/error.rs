//! Error types for the market-data cache.

use thiserror::Error;

/// Top-level error surfaced by the cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("No analysis data for pair {pair} and timeframe {timeframe}")]
    NotFound { pair: String, timeframe: String },

    #[error("Service not initialized: {0}")]
    NotInitialized(String),

    #[error("Engine unready: none of {attempted} keys could be loaded")]
    Unready { attempted: usize },

    #[error("Upstream error: {0}")]
    Upstream(#[from] SourceError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl CacheError {
    /// Build a not-found error for a (pair, timeframe) lookup.
    pub fn not_found(pair: &str, timeframe: &str) -> Self {
        CacheError::NotFound {
            pair: pair.to_string(),
            timeframe: timeframe.to_string(),
        }
    }

    /// Whether the error reports a missing key rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound { .. })
    }
}

/// Upstream market-data source errors.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out after {after_secs}s")]
    Timeout { after_secs: u64 },

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Upstream returned no candles for {pair} {timeframe}")]
    Empty { pair: String, timeframe: String },

    #[error("Upstream listed no symbols ending in {suffix}")]
    NoSymbols { suffix: String },
}

/// Durable and shared storage tier errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage operation timed out after {after_secs}s")]
    Timeout { after_secs: u64 },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Indicator calculation errors.
#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },
}

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
