//! Engine facade: owns both caches and their background refresh.

use market_core::error::CacheError;
use market_core::traits::{CandleSource, PairsSource, PairsStore, SharedCache, SnapshotStore};
use market_core::types::AnalysisResult;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::manager::{CacheManager, CacheStats};
use crate::pairs::PairsCatalog;
use crate::scheduler::RefreshScheduler;
use crate::settings::{EngineSettings, StartupMode};

/// Concrete backends injected at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub candles: Arc<dyn CandleSource>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub shared: Option<Arc<dyn SharedCache>>,
    pub symbols: Arc<dyn PairsSource>,
    pub pairs_store: Arc<dyn PairsStore>,
}

/// Per-key line of a status report.
#[derive(Debug, Clone, Serialize)]
pub struct EntryStatus {
    pub key: String,
    pub computed_at: i64,
    pub candles: usize,
    pub last_close: Option<f64>,
    pub rsi: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub mode: StartupMode,
    pub stats: CacheStats,
    pub entries: Vec<EntryStatus>,
    /// `None` while the catalog is not initialized
    pub pairs_count: Option<usize>,
    pub schedulers: Vec<String>,
}

/// The read surface handed to request handlers, plus lifecycle control.
pub struct Engine {
    cache: Arc<CacheManager>,
    catalog: Arc<PairsCatalog>,
    mode: StartupMode,
    shutdown_tx: watch::Sender<bool>,
    schedulers: Vec<RefreshScheduler>,
}

impl Engine {
    /// Build both caches, run the startup pass for `settings.mode` and spawn
    /// the refresh loops.
    ///
    /// In live mode startup fails with [`CacheError::Unready`] when not a
    /// single tracked key could be fetched. A catalog that fails to load is
    /// logged and left uninitialized.
    ///
    /// The analysis loop runs in live mode only. The pairs loop runs whenever
    /// the catalog came from a download, whatever the mode.
    pub async fn start(settings: EngineSettings, collab: Collaborators) -> Result<Self, CacheError> {
        let cache = Arc::new(CacheManager::new(
            collab.candles,
            collab.snapshots,
            collab.shared,
            settings.cache.clone(),
        ));
        let catalog = Arc::new(PairsCatalog::new(
            collab.symbols,
            collab.pairs_store,
            settings.catalog.clone(),
        ));

        info!(mode = %settings.mode, keys = settings.cache.tracked_keys().len(), "Starting analysis engine");

        let (catalog_outcome, warmed) = tokio::join!(
            catalog.initialize(settings.download_pairs_on_start),
            Self::warm(&cache, settings.mode),
        );

        let catalog_downloaded = match catalog_outcome {
            Ok(load) => load.downloaded,
            Err(e) => {
                warn!(error = %e, "Continuing without a pairs catalog");
                false
            }
        };
        warmed?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut schedulers = Vec::new();
        if settings.mode == StartupMode::Live {
            schedulers.push(RefreshScheduler::spawn(
                cache.clone(),
                settings.cache.refresh_interval,
                shutdown_rx.clone(),
            ));
        }
        if catalog_downloaded {
            schedulers.push(RefreshScheduler::spawn(
                catalog.clone(),
                settings.catalog.refresh_interval,
                shutdown_rx,
            ));
        }

        let entries = cache.len().await;
        let pairs = catalog.count().await;
        info!(
            entries,
            pairs,
            schedulers = schedulers.len(),
            "Analysis engine ready"
        );

        Ok(Self {
            cache,
            catalog,
            mode: settings.mode,
            shutdown_tx,
            schedulers,
        })
    }

    async fn warm(cache: &CacheManager, mode: StartupMode) -> Result<(), CacheError> {
        match mode {
            StartupMode::CacheOnly => {
                cache.warm_from_store().await;
                Ok(())
            }
            StartupMode::Live => {
                let report = cache.refresh_all().await;
                info!(
                    succeeded = report.succeeded.len(),
                    failed = report.failed.len(),
                    "Initial analysis pass complete"
                );
                if report.attempted() > 0 && report.succeeded.is_empty() {
                    return Err(CacheError::Unready {
                        attempted: report.attempted(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Cached analysis for a key. Never fetches.
    pub async fn get_pair_info(&self, pair: &str, timeframe: &str) -> Result<Arc<AnalysisResult>, CacheError> {
        self.cache
            .get(pair, timeframe)
            .await
            .ok_or_else(|| CacheError::not_found(pair, timeframe))
    }

    pub async fn get_all_pairs(&self) -> Result<Vec<String>, CacheError> {
        self.catalog.get_all_pairs().await
    }

    pub async fn is_valid_pair(&self, pair: &str) -> Result<bool, CacheError> {
        self.catalog.contains(pair).await
    }

    /// Keys currently held in the hot tier, as `pair:timeframe`.
    pub async fn available(&self) -> Vec<String> {
        self.cache.keys().await.iter().map(|k| k.to_string()).collect()
    }

    pub fn mode(&self) -> StartupMode {
        self.mode
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    pub fn catalog(&self) -> &Arc<PairsCatalog> {
        &self.catalog
    }

    pub async fn status(&self) -> EngineStatus {
        let mut entries = Vec::new();
        for key in self.cache.keys().await {
            if let Some(result) = self.cache.get(&key.pair, &key.timeframe).await {
                entries.push(EntryStatus {
                    key: key.to_string(),
                    computed_at: result.computed_at,
                    candles: result.candles.len(),
                    last_close: result.last_close(),
                    rsi: result.indicators.rsi,
                });
            }
        }

        let pairs_count = if self.catalog.is_ready().await {
            Some(self.catalog.count().await)
        } else {
            None
        };

        EngineStatus {
            mode: self.mode,
            stats: self.cache.stats().await,
            entries,
            pairs_count,
            schedulers: self
                .schedulers
                .iter()
                .filter(|s| !s.is_finished())
                .map(|s| s.label().to_string())
                .collect(),
        }
    }

    /// Stop the refresh loops and wait for them to exit.
    pub async fn shutdown(self) {
        info!("Shutting down analysis engine");
        let _ = self.shutdown_tx.send(true);
        for scheduler in self.schedulers {
            scheduler.join().await;
        }
        info!("Analysis engine stopped");
    }
}
