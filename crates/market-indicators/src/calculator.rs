//! Composite indicator calculation for one candle series.

use market_core::traits::Indicator;
use market_core::types::{closes, Candle, TechnicalIndicators};
use tracing::debug;

use crate::momentum::{macd_signal, Rsi};
use crate::moving_average::{Ema, Sma};

/// Minimum history before any indicator is computed (the SMA50 window).
pub const MIN_CANDLES: usize = 50;

/// RSI lookback used for cached analyses.
pub const RSI_PERIOD: usize = 14;

/// Compute every cached indicator for a candle series ordered oldest first.
///
/// With fewer than [`MIN_CANDLES`] candles this returns the all-zero
/// [`TechnicalIndicators`], which means "not enough history yet" rather than
/// an error.
pub fn calculate_indicators(candles: &[Candle]) -> TechnicalIndicators {
    if candles.len() < MIN_CANDLES {
        debug!(
            candles = candles.len(),
            required = MIN_CANDLES,
            "Not enough candles for indicators"
        );
        return TechnicalIndicators::default();
    }

    let closes = closes(candles);

    let sma20 = Sma::new(20).value(&closes);
    let sma50 = Sma::new(50).value(&closes);
    let ema12 = Ema::new(12).value(&closes);
    let ema26 = Ema::new(26).value(&closes);
    let rsi = Rsi::new(RSI_PERIOD).value(&closes);

    let macd = ema12 - ema26;
    let signal = macd_signal(ema12, ema26);

    TechnicalIndicators {
        sma20,
        sma50,
        ema12,
        ema26,
        rsi,
        macd,
        signal,
        histogram: macd - signal,
    }
}
