//! Technical indicators for the analysis cache.
//!
//! This crate provides the pure, deterministic calculator behind every cached
//! analysis:
//! - Moving averages (SMA, EMA seeded from the oldest window)
//! - Momentum indicators (RSI over the latest transitions, MACD)
//! - The composite [`calculate_indicators`] producing a [`TechnicalIndicators`]
//!
//! Identical input sequences always produce bit-identical output, so a cached
//! result is interchangeable with a fresh recomputation.
//!
//! [`TechnicalIndicators`]: market_core::TechnicalIndicators

pub mod calculator;
pub mod momentum;
pub mod moving_average;

pub use calculator::{calculate_indicators, MIN_CANDLES, RSI_PERIOD};
pub use momentum::{macd_signal, rsi, Rsi};
pub use moving_average::{ema, sma, Ema, Sma};
