//! Validate configuration command.

use anyhow::Result;
use market_config::load_config;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match load_config(config_path) {
        Ok(config) => {
            let settings = config.engine_settings(None);
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Startup mode: {}", settings.mode);
            println!("Pairs: {}", settings.cache.pairs.join(", "));
            println!("Timeframes: {}", settings.cache.timeframes.join(", "));
            println!("Tracked keys: {}", settings.cache.tracked_keys().len());
            println!("Refresh interval: {}s", settings.cache.refresh_interval.as_secs());
            match &config.upstream.csv_dir {
                Some(dir) => println!("Candles: CSV files in {}", dir.display()),
                None => println!("Candles: {}", config.upstream.base_url),
            }
            println!("Analysis snapshot: {}", config.storage.analysis_file.display());
            let shared = match (&config.storage.redis_url, config.engine.use_shared_cache) {
                (_, false) => "disabled",
                (Some(_), true) => "redis",
                (None, true) => "in-process",
            };
            println!("Shared tier: {}", shared);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
