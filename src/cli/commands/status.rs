//! Status report command.

use anyhow::Result;
use market_monitor::render_status;
use std::path::Path;

use super::start_engine;
use crate::cli::StatusArgs;

pub async fn run(args: StatusArgs, config_path: &Path) -> Result<()> {
    let (_, engine) = start_engine(config_path, args.mode.mode).await?;

    let status = engine.status().await;
    engine.shutdown().await;

    match args.output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&status)?),
        _ => print!("{}", render_status(&status)),
    }
    Ok(())
}
