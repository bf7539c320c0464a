//! Upstream market-data source traits.

use crate::error::SourceError;
use crate::types::Candle;
use async_trait::async_trait;

/// Trait for upstream candle providers.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch the most recent candles for a pair and timeframe.
    ///
    /// # Arguments
    /// * `pair` - Instrument symbol, e.g. "BTCUSDT"
    /// * `timeframe` - Interval string, e.g. "1h"
    /// * `limit` - Maximum number of candles
    ///
    /// # Returns
    /// Candles ordered from oldest to newest. An empty vector is a soft failure
    /// the caller decides how to treat.
    async fn fetch_candles(
        &self,
        pair: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, SourceError>;

    /// Get the source name.
    fn name(&self) -> &str;
}

/// Trait for providers of the tradable symbol list.
#[async_trait]
pub trait PairsSource: Send + Sync {
    /// Download every symbol the provider lists, unfiltered.
    async fn download_all_symbols(&self) -> Result<Vec<String>, SourceError>;
}
