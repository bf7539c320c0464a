//! File-backed durable snapshot tier.

use async_trait::async_trait;
use market_core::error::StoreError;
use market_core::traits::SnapshotStore;
use market_core::types::{AnalysisResult, CacheKey};
use serde_json::Value;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Stores one JSON-encoded [`AnalysisResult`] per line.
///
/// Saving rewrites the whole file through a fresh temp file and rename,
/// replacing the line for the same key. The write lock is held until the
/// rename lands, even if the caller stops waiting. A pretty-printed JSON array (the legacy snapshot
/// layout) is also accepted on load.
pub struct JsonLinesSnapshotStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonLinesSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Vec<AnalysisResult>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim_start().starts_with('[') {
            let raw: Vec<Value> = serde_json::from_str(&content)?;
            return Ok(raw
                .into_iter()
                .enumerate()
                .filter_map(|(idx, value)| match serde_json::from_value::<AnalysisResult>(value) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(
                            file = %self.path.display(),
                            entry = idx,
                            error = %e,
                            "Skipping malformed snapshot entry"
                        );
                        None
                    }
                })
                .collect());
        }

        let mut entries = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AnalysisResult>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    file = %self.path.display(),
                    line = lineno + 1,
                    error = %e,
                    "Skipping malformed snapshot line"
                ),
            }
        }
        Ok(entries)
    }
}

/// Write `body` to a unique temp file next to `path`, then rename it over `path`.
fn replace_file(path: &Path, body: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            dir
        }
        None => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl SnapshotStore for JsonLinesSnapshotStore {
    async fn save(&self, key: &CacheKey, result: &AnalysisResult) -> Result<(), StoreError> {
        let guard = Arc::clone(&self.write_lock).lock_owned().await;

        let mut entries = self.read_entries().await?;
        entries.retain(|e| e.pair != key.pair || e.timeframe != key.timeframe);
        entries.push(result.clone());
        entries.sort_by(|a, b| (&a.pair, &a.timeframe).cmp(&(&b.pair, &b.timeframe)));

        let mut body = String::new();
        for entry in &entries {
            body.push_str(&serde_json::to_string(entry)?);
            body.push('\n');
        }

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            replace_file(&path, body.as_bytes())
        })
        .await
        .map_err(|e| StoreError::Backend(format!("snapshot writer task failed: {}", e)))??;
        debug!(key = %key, file = %self.path.display(), "Snapshot saved");
        Ok(())
    }

    async fn load(&self, key: &CacheKey) -> Result<Option<AnalysisResult>, StoreError> {
        let entries = self.read_entries().await?;
        Ok(entries
            .into_iter()
            .find(|e| e.pair == key.pair && e.timeframe == key.timeframe))
    }

    async fn load_all(&self) -> Result<Vec<AnalysisResult>, StoreError> {
        self.read_entries().await
    }
}
