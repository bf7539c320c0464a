//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, EngineConfig, LoggingConfig, PairsConfig, StorageConfig,
    UpstreamConfig,
};

use config::{Config, Environment, File, FileFormat};
use std::path::Path;
use thiserror::Error;

/// Why a configuration could not be used.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn environment() -> Environment {
    Environment::with_prefix("MARKET")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("engine.pairs")
        .with_list_parse_key("engine.timeframes")
}

fn build(path: &Path, required: bool) -> Result<AppConfig, SettingsError> {
    let config = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(required))
        .add_source(environment())
        .build()?;

    let app: AppConfig = config.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

/// Load configuration from file and environment. The file must exist.
pub fn load_config(path: &Path) -> Result<AppConfig, SettingsError> {
    build(path, true)
}

/// Like [`load_config`], but a missing file means built-in defaults.
pub fn load_config_or_default(path: &Path) -> Result<AppConfig, SettingsError> {
    build(path, false)
}

/// Parse configuration from a TOML string, without environment overrides.
pub fn parse_config(raw: &str) -> Result<AppConfig, SettingsError> {
    let app: AppConfig = toml::from_str(raw).map_err(|e| SettingsError::Invalid(e.to_string()))?;
    app.validate()?;
    Ok(app)
}
