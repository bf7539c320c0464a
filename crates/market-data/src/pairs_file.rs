//! File-backed pairs catalog store.

use async_trait::async_trait;
use market_core::error::StoreError;
use market_core::traits::PairsStore;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Persists the catalog as a JSON array of symbols.
pub struct JsonPairsStore {
    path: PathBuf,
}

impl JsonPairsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PairsStore for JsonPairsStore {
    async fn save(&self, pairs: &[String]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let body = serde_json::to_vec(pairs)?;
        fs::write(&self.path, body).await?;

        debug!(file = %self.path.display(), count = pairs.len(), "Pairs saved");
        Ok(())
    }

    // A missing file is an error here: the catalog falls back to a download.
    async fn load(&self) -> Result<Vec<String>, StoreError> {
        let body = fs::read(&self.path).await?;
        let pairs: Vec<String> = serde_json::from_slice(&body)?;

        debug!(file = %self.path.display(), count = pairs.len(), "Pairs loaded");
        Ok(pairs)
    }
}
