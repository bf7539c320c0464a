//! Runtime settings for the cache engine.

use market_core::types::CacheKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How the engine fills its hot tier at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupMode {
    /// Fetch every tracked key from upstream, then keep refreshing.
    Live,
    /// Serve whatever the durable tier holds; never call the candle source.
    #[default]
    #[serde(alias = "cache-only")]
    CacheOnly,
}

impl fmt::Display for StartupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupMode::Live => f.write_str("live"),
            StartupMode::CacheOnly => f.write_str("cache-only"),
        }
    }
}

impl FromStr for StartupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" => Ok(StartupMode::Live),
            "cache-only" | "cache_only" | "cache" => Ok(StartupMode::CacheOnly),
            _ => Err(format!("Invalid startup mode: {}", s)),
        }
    }
}

/// Settings for the analysis cache manager.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub pairs: Vec<String>,
    pub timeframes: Vec<String>,
    /// Candles requested per key
    pub candle_limit: usize,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub store_timeout: Duration,
    /// TTL applied on the shared tier
    pub shared_ttl: Duration,
}

impl CacheSettings {
    /// Every (pair, timeframe) the manager keeps fresh.
    pub fn tracked_keys(&self) -> Vec<CacheKey> {
        CacheKey::grid(&self.pairs, &self.timeframes)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            pairs: vec!["BTCUSDT".into(), "ETHUSDT".into(), "BNBUSDT".into()],
            timeframes: vec!["5m".into(), "1h".into()],
            candle_limit: 900,
            refresh_interval: Duration::from_secs(600),
            fetch_timeout: Duration::from_secs(30),
            store_timeout: Duration::from_secs(3),
            shared_ttl: Duration::from_secs(3600),
        }
    }
}

/// Settings for the pairs catalog.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    /// Only symbols ending with this are kept
    pub quote_suffix: String,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub store_timeout: Duration,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            quote_suffix: "USDT".into(),
            refresh_interval: Duration::from_secs(3600),
            fetch_timeout: Duration::from_secs(30),
            store_timeout: Duration::from_secs(3),
        }
    }
}

/// Everything [`crate::Engine::start`] needs besides its collaborators.
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub mode: StartupMode,
    pub cache: CacheSettings,
    pub catalog: CatalogSettings,
    /// Download the catalog instead of loading the stored copy first.
    pub download_pairs_on_start: bool,
}

impl EngineSettings {
    /// Defaults for a mode, with the catalog download following the mode.
    pub fn for_mode(mode: StartupMode) -> Self {
        Self {
            mode,
            download_pairs_on_start: mode == StartupMode::Live,
            ..Default::default()
        }
    }
}
