//! Derived analysis types and the cache key.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Candle;

/// Indicator values derived from one candle series.
///
/// The all-zero value (`Default`) means the series was too short to compute anything.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    pub sma20: f64,
    pub sma50: f64,
    pub ema12: f64,
    pub ema26: f64,
    pub rsi: f64,
    pub macd: f64,
    /// Simplified signal line, see `market_indicators::macd_signal`.
    pub signal: f64,
    pub histogram: f64,
}

impl TechnicalIndicators {
    /// Whether this is the "not enough history" placeholder.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Composite primary key of the cache: (pair, timeframe).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub pair: String,
    pub timeframe: String,
}

impl CacheKey {
    pub fn new(pair: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            pair: pair.into(),
            timeframe: timeframe.into(),
        }
    }

    /// Cartesian product of pairs and timeframes, pair-major.
    pub fn grid(pairs: &[String], timeframes: &[String]) -> Vec<CacheKey> {
        pairs
            .iter()
            .flat_map(|p| timeframes.iter().map(move |t| CacheKey::new(p.clone(), t.clone())))
            .collect()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pair, self.timeframe)
    }
}

/// Latest analysis for one (pair, timeframe).
///
/// Produced whole by a refresh and swapped in atomically; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub pair: String,
    pub timeframe: String,
    pub candles: Vec<Candle>,
    pub indicators: TechnicalIndicators,
    /// Unix seconds
    #[serde(alias = "timestamp")]
    pub computed_at: i64,
}

impl AnalysisResult {
    /// Build a result stamped with the current time.
    pub fn new(key: &CacheKey, candles: Vec<Candle>, indicators: TechnicalIndicators) -> Self {
        Self {
            pair: key.pair.clone(),
            timeframe: key.timeframe.clone(),
            candles,
            indicators,
            computed_at: Utc::now().timestamp(),
        }
    }

    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.pair.clone(), self.timeframe.clone())
    }

    /// Most recent close, if any candles are present.
    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }
}
