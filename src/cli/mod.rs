//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use market_cache::StartupMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "market-cache")]
#[command(author, version, about = "Market-data analysis engine with a multi-tier cache")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "MARKET_CONFIG")]
    pub config: PathBuf,

    /// Log level; defaults to the configured one
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Also write logs to a daily rolling file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the engine and keep it refreshing until Ctrl-C
    Run(ModeArgs),
    /// Print the cached analysis for one pair and timeframe
    Pair(PairArgs),
    /// Print the pairs catalog
    Pairs(ModeArgs),
    /// Print a status report
    Status(StatusArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct ModeArgs {
    /// Startup mode (live, cache-only); defaults to the configured one
    #[arg(short, long)]
    pub mode: Option<StartupMode>,
}

#[derive(clap::Args)]
pub struct PairArgs {
    /// Trading pair, e.g. BTCUSDT
    pub pair: String,

    /// Timeframe, e.g. 1h
    pub timeframe: String,

    #[command(flatten)]
    pub mode: ModeArgs,
}

#[derive(clap::Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub mode: ModeArgs,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: String,
}
