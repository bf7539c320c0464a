//! CLI command implementations.

pub mod pair;
pub mod pairs;
pub mod run;
pub mod status;
pub mod validate;

use anyhow::{Context, Result};
use market_cache::{Collaborators, Engine, StartupMode};
use market_config::{load_config_or_default, AppConfig};
use market_core::traits::{CandleSource, SharedCache};
use market_data::{
    BinanceConfig, BinanceSource, CsvCandleSource, JsonLinesSnapshotStore, JsonPairsStore,
    MemorySharedCache, RedisSharedCache,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Redis when a URL is configured, else an in-process map.
///
/// An unreachable Redis is logged and the engine runs without a shared tier.
async fn shared_tier(config: &AppConfig) -> Option<Arc<dyn SharedCache>> {
    if !config.engine.use_shared_cache {
        return None;
    }
    let Some(url) = &config.storage.redis_url else {
        return Some(Arc::new(MemorySharedCache::new()));
    };

    let timeout = Duration::from_secs(config.engine.store_timeout_secs);
    match tokio::time::timeout(timeout, RedisSharedCache::connect(url)).await {
        Ok(Ok(redis)) => Some(Arc::new(redis)),
        Ok(Err(e)) => {
            warn!(error = %e, "Redis unavailable, running without a shared tier");
            None
        }
        Err(_) => {
            warn!(after_secs = timeout.as_secs(), "Redis connect timed out, running without a shared tier");
            None
        }
    }
}

/// Wire concrete backends from the configuration.
async fn collaborators(config: &AppConfig) -> Result<Collaborators> {
    let binance = Arc::new(
        BinanceSource::new(BinanceConfig {
            base_url: config.upstream.base_url.clone(),
            timeout: Duration::from_secs(config.engine.fetch_timeout_secs),
        })
        .context("Failed to create upstream client")?,
    );

    let candles: Arc<dyn CandleSource> = match &config.upstream.csv_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Reading candles from CSV files");
            Arc::new(CsvCandleSource::new(dir).context("Failed to open CSV directory")?)
        }
        None => binance.clone(),
    };

    Ok(Collaborators {
        candles,
        snapshots: Arc::new(JsonLinesSnapshotStore::new(&config.storage.analysis_file)),
        shared: shared_tier(config).await,
        symbols: binance,
        pairs_store: Arc::new(JsonPairsStore::new(&config.storage.pairs_file)),
    })
}

/// Load configuration and start an engine.
pub(crate) async fn start_engine(
    config_path: &Path,
    mode: Option<StartupMode>,
) -> Result<(AppConfig, Engine)> {
    let config = load_config_or_default(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    let settings = config.engine_settings(mode);
    let engine = Engine::start(settings, collaborators(&config).await?)
        .await
        .context("Failed to start analysis engine")?;
    Ok((config, engine))
}
