//! Core data types for the market-data cache.

mod analysis;
mod candle;
mod timeframe;

pub use analysis::{AnalysisResult, CacheKey, TechnicalIndicators};
pub use candle::{closes, is_ordered, Candle};
pub use timeframe::Timeframe;
