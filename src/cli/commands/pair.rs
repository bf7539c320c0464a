//! Single-key lookup command.

use anyhow::Result;
use std::path::Path;

use super::start_engine;
use crate::cli::PairArgs;

pub async fn run(args: PairArgs, config_path: &Path) -> Result<()> {
    let (_, engine) = start_engine(config_path, args.mode.mode).await?;

    let lookup = engine
        .get_pair_info(&args.pair.to_uppercase(), &args.timeframe)
        .await;
    engine.shutdown().await;

    let result = lookup?;
    println!("{}", serde_json::to_string_pretty(result.as_ref())?);
    Ok(())
}
