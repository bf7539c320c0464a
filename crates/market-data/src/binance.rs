//! Binance REST source for candles and the symbol list.

use async_trait::async_trait;
use market_core::error::SourceError;
use market_core::traits::{CandleSource, PairsSource};
use market_core::types::Candle;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Default public REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com/api/v3";

/// Binance client configuration.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<ExchangeSymbol>,
}

#[derive(Debug, Deserialize)]
struct ExchangeSymbol {
    symbol: String,
}

/// Binance market-data client.
pub struct BinanceSource {
    config: BinanceConfig,
    client: Client,
}

impl BinanceSource {
    /// Create a new client.
    pub fn new(config: BinanceConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn map_request_error(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout {
                after_secs: self.config.timeout.as_secs(),
            }
        } else {
            SourceError::Connection(err.to_string())
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(SourceError::Api(format!("{}: {}", status, text)));
        }

        resp.json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))
    }
}

/// Decode one kline row: `[openTime, "open", "high", "low", "close", "volume", closeTime, ...]`.
pub(crate) fn parse_kline(row: &[Value]) -> Result<Candle, SourceError> {
    if row.len() < 7 {
        return Err(SourceError::Parse(format!(
            "kline row has {} fields, expected at least 7",
            row.len()
        )));
    }

    let time = |idx: usize| {
        row[idx]
            .as_i64()
            .ok_or_else(|| SourceError::Parse(format!("field {} is not a timestamp: {}", idx, row[idx])))
    };
    let price = |idx: usize| {
        let value = match &row[idx] {
            Value::String(s) => s
                .parse::<f64>()
                .map_err(|e| SourceError::Parse(format!("field {}: {}", idx, e)))?,
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| SourceError::Parse(format!("field {} out of range", idx)))?,
            other => return Err(SourceError::Parse(format!("field {} is not numeric: {}", idx, other))),
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(SourceError::Parse(format!("field {} is not finite: {}", idx, row[idx])))
        }
    };

    Ok(Candle::new(
        time(0)?,
        time(6)?,
        price(1)?,
        price(2)?,
        price(3)?,
        price(4)?,
        price(5)?,
    ))
}

#[async_trait]
impl CandleSource for BinanceSource {
    async fn fetch_candles(
        &self,
        pair: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, SourceError> {
        let url = format!("{}/klines", self.config.base_url);
        let params = [
            ("symbol", pair.to_string()),
            ("interval", timeframe.to_string()),
            ("limit", limit.to_string()),
        ];

        debug!(pair, timeframe, limit, "Requesting klines");
        let rows: Vec<Vec<Value>> = self.get_json(&url, &params).await?;

        let mut candles = Vec::with_capacity(rows.len());
        for row in &rows {
            match parse_kline(row) {
                Ok(candle) if candle.is_valid() => candles.push(candle),
                Ok(candle) => warn!(pair, timeframe, open_time = candle.open_time, "Skipping inverted kline"),
                Err(e) => warn!(pair, timeframe, error = %e, "Skipping malformed kline"),
            }
        }

        debug!(pair, timeframe, returned = candles.len(), "Klines received");
        Ok(candles)
    }

    fn name(&self) -> &str {
        "Binance"
    }
}

#[async_trait]
impl PairsSource for BinanceSource {
    async fn download_all_symbols(&self) -> Result<Vec<String>, SourceError> {
        let url = format!("{}/exchangeInfo", self.config.base_url);
        let info: ExchangeInfo = self.get_json(&url, &[]).await?;

        Ok(info.symbols.into_iter().map(|s| s.symbol).collect())
    }
}
