//! Scripted collaborators for unit tests.

use async_trait::async_trait;
use market_core::error::SourceError;
use market_core::traits::{CandleSource, PairsSource};
use market_core::types::{AnalysisResult, Candle, CacheKey};
use market_indicators::calculate_indicators;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Clone)]
pub(crate) enum Script {
    Candles(Vec<Candle>),
    Fail,
    Hang,
}

/// Candle source whose answer per key is set by the test.
pub(crate) struct ScriptedSource {
    scripts: Mutex<HashMap<(String, String), Script>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn script(&self, pair: &str, timeframe: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .insert((pair.to_string(), timeframe.to_string()), script);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandleSource for ScriptedSource {
    async fn fetch_candles(
        &self,
        pair: &str,
        timeframe: &str,
        _limit: usize,
    ) -> Result<Vec<Candle>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&(pair.to_string(), timeframe.to_string()))
            .cloned();

        match script {
            Some(Script::Candles(candles)) => Ok(candles),
            Some(Script::Hang) => std::future::pending().await,
            Some(Script::Fail) | None => Err(SourceError::Connection("scripted failure".into())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Symbol source returning a fixed answer.
pub(crate) struct FixedSymbols {
    symbols: Mutex<Result<Vec<String>, String>>,
    calls: AtomicUsize,
}

impl FixedSymbols {
    pub(crate) fn ok(symbols: &[&str]) -> Self {
        Self {
            symbols: Mutex::new(Ok(symbols.iter().map(|s| s.to_string()).collect())),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            symbols: Mutex::new(Err("exchange unreachable".into())),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set(&self, symbols: Result<Vec<String>, String>) {
        *self.symbols.lock().unwrap() = symbols;
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PairsSource for FixedSymbols {
    async fn download_all_symbols(&self) -> Result<Vec<String>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.symbols
            .lock()
            .unwrap()
            .clone()
            .map_err(SourceError::Connection)
    }
}

/// `len` one-minute candles trending up from `start`.
pub(crate) fn candles(len: usize, start: f64) -> Vec<Candle> {
    (0..len)
        .map(|i| {
            let close = start + i as f64 * 0.25 + (i as f64 * 0.9).sin();
            let t = i as i64 * 60_000;
            Candle::new(t, t + 59_999, close - 0.1, close + 0.5, close - 0.5, close, 5.0)
        })
        .collect()
}

pub(crate) fn result_for(pair: &str, timeframe: &str, len: usize) -> AnalysisResult {
    let series = candles(len, 100.0);
    let indicators = calculate_indicators(&series);
    AnalysisResult::new(&CacheKey::new(pair, timeframe), series, indicators)
}
