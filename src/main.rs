//! Market-data analysis cache CLI.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use market_config::load_config_or_default;
use market_monitor::setup_logging;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; command-line flags win over the config file
    let logging = load_config_or_default(&cli.config)
        .map(|config| config.logging)
        .unwrap_or_default();
    let log_level = match cli.log_level {
        Some(cli::LogLevel::Trace) => "trace",
        Some(cli::LogLevel::Debug) => "debug",
        Some(cli::LogLevel::Info) => "info",
        Some(cli::LogLevel::Warn) => "warn",
        Some(cli::LogLevel::Error) => "error",
        None => logging.level.as_str(),
    };
    let log_file = cli.log_file.clone().or_else(|| logging.file.as_ref().map(PathBuf::from));
    let _guard = setup_logging(
        log_level,
        cli.json_logs || logging.is_json(),
        log_file.as_deref(),
    );

    // Execute command
    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, &cli.config).await,
        Commands::Pair(args) => cli::commands::pair::run(args, &cli.config).await,
        Commands::Pairs(args) => cli::commands::pairs::run(args, &cli.config).await,
        Commands::Status(args) => cli::commands::status::run(args, &cli.config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
