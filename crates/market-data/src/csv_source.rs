//! CSV candle source for offline runs.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use market_core::error::SourceError;
use market_core::traits::CandleSource;
use market_core::types::{Candle, Timeframe};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "openTime", alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    open_time: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: f64,
    #[serde(alias = "closeTime", default)]
    close_time: Option<i64>,
}

/// Reads `{dir}/{PAIR}_{timeframe}.csv` files as an upstream source.
pub struct CsvCandleSource {
    dir: PathBuf,
}

impl CsvCandleSource {
    /// Create a new CSV source rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(SourceError::Connection(format!(
                "CSV directory {} does not exist",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    /// Path of the file backing one series.
    pub fn file_for(&self, pair: &str, timeframe: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.csv", pair, timeframe))
    }
}

/// Load candles from a specific path, oldest first.
///
/// Blocking; callers run it off the async workers.
fn load_from_path(path: &Path, timeframe: &str) -> Result<Vec<Candle>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| SourceError::Parse(e.to_string()))?;

    let width = timeframe.parse::<Timeframe>().ok().map(|tf| tf.as_millis());
    let mut candles = Vec::new();

    for result in reader.deserialize() {
        let record: CsvRecord = result.map_err(|e| SourceError::Parse(e.to_string()))?;
        let open_time = parse_timestamp(&record.open_time)?;

        let close_time = match (record.close_time, width) {
            (Some(t), _) => t,
            (None, Some(w)) => open_time.saturating_add(w - 1),
            (None, None) => {
                return Err(SourceError::Parse(format!(
                    "no close time and unknown timeframe {}",
                    timeframe
                )))
            }
        };

        let candle = Candle::new(
            open_time,
            close_time,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        );
        if candle.is_valid() {
            candles.push(candle);
        } else {
            warn!(file = %path.display(), open_time, "Skipping invalid CSV row");
        }
    }

    candles.sort_by_key(|c| c.open_time);

    Ok(candles)
}

/// Parse various timestamp formats into Unix milliseconds.
fn parse_timestamp(date_str: &str) -> Result<i64, SourceError> {
    // Integer epochs are milliseconds, like Binance openTime
    if let Ok(ts) = date_str.parse::<i64>() {
        return Ok(ts);
    }

    let formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    if let Some(dt) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(dt.and_utc().timestamp_millis());
    }

    Err(SourceError::Parse(format!(
        "Could not parse date: {}",
        date_str
    )))
}

#[async_trait]
impl CandleSource for CsvCandleSource {
    async fn fetch_candles(
        &self,
        pair: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, SourceError> {
        let path = self.file_for(pair, timeframe);
        let tf = timeframe.to_string();
        let loaded = tokio::task::spawn_blocking(move || {
            if !path.exists() {
                return Ok(None);
            }
            load_from_path(&path, &tf).map(Some)
        })
        .await
        .map_err(|e| SourceError::Connection(format!("CSV reader task failed: {}", e)))??;

        let Some(mut candles) = loaded else {
            return Err(SourceError::Empty {
                pair: pair.to_string(),
                timeframe: timeframe.to_string(),
            });
        };
        let skip = candles.len().saturating_sub(limit);
        candles.drain(..skip);
        Ok(candles)
    }

    fn name(&self) -> &str {
        "CSV"
    }
}
