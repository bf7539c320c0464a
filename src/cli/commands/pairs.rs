//! Catalog listing command.

use anyhow::Result;
use std::path::Path;

use super::start_engine;
use crate::cli::ModeArgs;

pub async fn run(args: ModeArgs, config_path: &Path) -> Result<()> {
    let (_, engine) = start_engine(config_path, args.mode).await?;

    let pairs = engine.get_all_pairs().await;
    engine.shutdown().await;

    let pairs = pairs?;
    for pair in &pairs {
        println!("{}", pair);
    }
    println!();
    println!("{} pairs", pairs.len());
    Ok(())
}
