//! Configuration structures.

use market_cache::{CacheSettings, CatalogSettings, EngineSettings, StartupMode};
use market_core::types::Timeframe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::SettingsError;

/// Longest TTL accepted for the shared tier (30 days).
pub const MAX_SHARED_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub pairs: PairsConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    /// `prod` starts in live mode unless `engine.mode` says otherwise
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "market-cache".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Directory-qualified file name for a daily rolling log
    pub file: Option<String>,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Analysis cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mode: Option<StartupMode>,
    pub pairs: Vec<String>,
    pub timeframes: Vec<String>,
    pub candle_limit: usize,
    pub refresh_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    pub store_timeout_secs: u64,
    pub shared_ttl_secs: u64,
    pub use_shared_cache: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let cache = CacheSettings::default();
        Self {
            mode: None,
            pairs: cache.pairs,
            timeframes: cache.timeframes,
            candle_limit: cache.candle_limit,
            refresh_interval_secs: cache.refresh_interval.as_secs(),
            fetch_timeout_secs: cache.fetch_timeout.as_secs(),
            store_timeout_secs: cache.store_timeout.as_secs(),
            shared_ttl_secs: cache.shared_ttl.as_secs(),
            use_shared_cache: true,
        }
    }
}

/// Pairs catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairsConfig {
    pub quote_suffix: String,
    pub refresh_interval_secs: u64,
    /// Unset follows the mode: live downloads, cache-only loads the stored list.
    pub download_on_start: Option<bool>,
}

impl Default for PairsConfig {
    fn default() -> Self {
        let catalog = CatalogSettings::default();
        Self {
            quote_suffix: catalog.quote_suffix,
            refresh_interval_secs: catalog.refresh_interval.as_secs(),
            download_on_start: None,
        }
    }
}

/// Where candles come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// When set, candles are read from `{csv_dir}/{PAIR}_{timeframe}.csv`
    pub csv_dir: Option<PathBuf>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com/api/v3".to_string(),
            csv_dir: None,
        }
    }
}

/// Durable tier file locations and the shared tier endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub analysis_file: PathBuf,
    pub pairs_file: PathBuf,
    /// Redis URL for the shared tier; unset keeps it in process
    pub redis_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            analysis_file: PathBuf::from("storage/analysis_cache.jsonl"),
            pairs_file: PathBuf::from("storage/pairs_cache.json"),
            redis_url: None,
        }
    }
}

impl AppConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let engine = &self.engine;
        if engine.pairs.is_empty() {
            return Err(SettingsError::Invalid("engine.pairs is empty".into()));
        }
        if engine.pairs.iter().any(|p| p.trim().is_empty()) {
            return Err(SettingsError::Invalid("engine.pairs contains a blank pair".into()));
        }
        if engine.timeframes.is_empty() {
            return Err(SettingsError::Invalid("engine.timeframes is empty".into()));
        }
        for tf in &engine.timeframes {
            tf.parse::<Timeframe>().map_err(SettingsError::Invalid)?;
        }

        let positive = [
            ("engine.candle_limit", engine.candle_limit as u64),
            ("engine.refresh_interval_secs", engine.refresh_interval_secs),
            ("engine.fetch_timeout_secs", engine.fetch_timeout_secs),
            ("engine.store_timeout_secs", engine.store_timeout_secs),
            ("engine.shared_ttl_secs", engine.shared_ttl_secs),
            ("pairs.refresh_interval_secs", self.pairs.refresh_interval_secs),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(SettingsError::Invalid(format!("{} must be greater than zero", name)));
        }
        if engine.shared_ttl_secs > MAX_SHARED_TTL_SECS {
            return Err(SettingsError::Invalid(format!(
                "engine.shared_ttl_secs must be at most {}",
                MAX_SHARED_TTL_SECS
            )));
        }

        if let Some(url) = &self.storage.redis_url {
            let known = ["redis://", "rediss://", "redis+unix://", "unix://"];
            if !known.iter().any(|scheme| url.starts_with(scheme)) {
                return Err(SettingsError::Invalid(format!(
                    "storage.redis_url has an unsupported scheme: {}",
                    url
                )));
            }
        }

        if self.pairs.quote_suffix.is_empty() {
            return Err(SettingsError::Invalid("pairs.quote_suffix is empty".into()));
        }
        Ok(())
    }

    /// Mode from config, else from the environment name.
    pub fn startup_mode(&self) -> StartupMode {
        self.engine.mode.unwrap_or_else(|| {
            if self.app.environment.eq_ignore_ascii_case("prod") {
                StartupMode::Live
            } else {
                StartupMode::CacheOnly
            }
        })
    }

    /// Engine settings, with an optional mode override from the command line.
    pub fn engine_settings(&self, mode: Option<StartupMode>) -> EngineSettings {
        let mode = mode.unwrap_or_else(|| self.startup_mode());
        let engine = &self.engine;
        let store_timeout = Duration::from_secs(engine.store_timeout_secs);
        let fetch_timeout = Duration::from_secs(engine.fetch_timeout_secs);

        EngineSettings {
            mode,
            cache: CacheSettings {
                pairs: engine.pairs.iter().map(|p| p.trim().to_uppercase()).collect(),
                timeframes: engine.timeframes.clone(),
                candle_limit: engine.candle_limit,
                refresh_interval: Duration::from_secs(engine.refresh_interval_secs),
                fetch_timeout,
                store_timeout,
                shared_ttl: Duration::from_secs(engine.shared_ttl_secs),
            },
            catalog: CatalogSettings {
                quote_suffix: self.pairs.quote_suffix.clone(),
                refresh_interval: Duration::from_secs(self.pairs.refresh_interval_secs),
                fetch_timeout,
                store_timeout,
            },
            download_pairs_on_start: self
                .pairs
                .download_on_start
                .unwrap_or(mode == StartupMode::Live),
        }
    }
}
