//! OHLCV candle type.

use serde::{Deserialize, Serialize};

/// One OHLCV bar for a fixed time bucket.
/// Uses f64 for fast indicator calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    /// Bucket open time, Unix milliseconds
    pub open_time: i64,
    /// Bucket close time, Unix milliseconds
    pub close_time: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Candle {
    /// Create a new candle.
    pub fn new(
        open_time: i64,
        close_time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            open_time,
            close_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// A candle must close after it opens and carry only finite values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.open_time < self.close_time
            && [self.open, self.high, self.low, self.close, self.volume]
                .iter()
                .all(|v| v.is_finite())
    }
}

/// Extract close prices, oldest first.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Check that a sequence is ordered oldest to newest.
pub fn is_ordered(candles: &[Candle]) -> bool {
    candles.windows(2).all(|w| w[0].open_time <= w[1].open_time)
}
