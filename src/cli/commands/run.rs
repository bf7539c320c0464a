//! Long-running engine command.

use anyhow::Result;
use market_monitor::summary_line;
use std::path::Path;
use tracing::{info, warn};

use super::start_engine;
use crate::cli::ModeArgs;

pub async fn run(args: ModeArgs, config_path: &Path) -> Result<()> {
    let (config, engine) = start_engine(config_path, args.mode).await?;
    let status = engine.status().await;
    info!(app = %config.app.name, "{}", summary_line(&status));

    let mut ticker = tokio::time::interval(engine.cache().settings().refresh_interval);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let status = engine.status().await;
                info!("{}", summary_line(&status));
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for Ctrl-C, stopping");
                }
                break;
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}
