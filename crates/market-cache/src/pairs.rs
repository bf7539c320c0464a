//! Catalog of tradable pairs.

use async_trait::async_trait;
use market_core::error::{CacheError, SourceError};
use market_core::traits::{PairsSource, PairsStore};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::bounded::{source_call, store_call};
use crate::scheduler::Refreshable;
use crate::settings::CatalogSettings;

/// Lifecycle of the catalog. There is no failed state: a failed refresh
/// leaves a ready catalog ready with its previous list.
#[derive(Debug, Clone)]
enum CatalogState {
    Uninitialized,
    Loading,
    Ready(Arc<Vec<String>>),
}

/// How [`PairsCatalog::initialize`] filled the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogLoad {
    pub pairs: usize,
    /// `false` when the stored copy was used
    pub downloaded: bool,
}

/// Keep symbols ending in `suffix`, preserving upstream order and dropping duplicates.
pub fn filter_pairs(symbols: Vec<String>, suffix: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| s.ends_with(suffix) && s.len() > suffix.len())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Flat snapshot of valid symbols, refreshed wholesale.
pub struct PairsCatalog {
    state: RwLock<CatalogState>,
    source: Arc<dyn PairsSource>,
    store: Arc<dyn PairsStore>,
    settings: CatalogSettings,
}

impl PairsCatalog {
    pub fn new(
        source: Arc<dyn PairsSource>,
        store: Arc<dyn PairsStore>,
        settings: CatalogSettings,
    ) -> Self {
        Self {
            state: RwLock::new(CatalogState::Uninitialized),
            source,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// First load. Downloads directly, or tries the stored copy and falls
    /// back to a download when it is missing, unreadable or empty once filtered.
    ///
    /// On failure the catalog goes back to uninitialized so reads keep
    /// reporting it.
    pub async fn initialize(&self, download_on_start: bool) -> Result<CatalogLoad, CacheError> {
        *self.state.write().await = CatalogState::Loading;

        let stored = if download_on_start {
            None
        } else {
            info!("Loading pairs catalog from store");
            self.load_stored().await
        };

        let outcome = match stored {
            Some(pairs) => {
                let count = pairs.len();
                self.publish(pairs).await;
                Ok(CatalogLoad {
                    pairs: count,
                    downloaded: false,
                })
            }
            None => {
                info!("Downloading pairs catalog");
                self.download_and_store().await.map(|count| CatalogLoad {
                    pairs: count,
                    downloaded: true,
                })
            }
        };

        match &outcome {
            Ok(load) => info!(pairs = load.pairs, downloaded = load.downloaded, "Pairs catalog initialized"),
            Err(e) => {
                error!(error = %e, "Pairs catalog failed to initialize");
                *self.state.write().await = CatalogState::Uninitialized;
            }
        }
        outcome
    }

    /// Stored list, filtered the same way as a download. `None` means download instead.
    async fn load_stored(&self) -> Option<Vec<String>> {
        match store_call(self.settings.store_timeout, self.store.load()).await {
            Ok(raw) => {
                let pairs = filter_pairs(raw, &self.settings.quote_suffix);
                if pairs.is_empty() {
                    warn!(suffix = %self.settings.quote_suffix, "Stored pairs list has no usable symbols, downloading instead");
                    None
                } else {
                    Some(pairs)
                }
            }
            Err(e) => {
                warn!(error = %e, "Stored pairs unavailable, downloading instead");
                None
            }
        }
    }

    /// Re-download the catalog. On failure the previous list stays.
    pub async fn refresh_catalog(&self) -> Result<usize, CacheError> {
        self.download_and_store().await
    }

    async fn download_and_store(&self) -> Result<usize, CacheError> {
        let symbols = source_call(self.settings.fetch_timeout, self.source.download_all_symbols()).await?;
        let pairs = filter_pairs(symbols, &self.settings.quote_suffix);

        if pairs.is_empty() {
            return Err(SourceError::NoSymbols {
                suffix: self.settings.quote_suffix.clone(),
            }
            .into());
        }

        let count = pairs.len();
        if let Err(e) = store_call(self.settings.store_timeout, self.store.save(&pairs)).await {
            warn!(error = %e, "Failed to persist pairs catalog");
        }
        self.publish(pairs).await;
        Ok(count)
    }

    async fn publish(&self, pairs: Vec<String>) {
        *self.state.write().await = CatalogState::Ready(Arc::new(pairs));
    }

    async fn snapshot(&self) -> Result<Arc<Vec<String>>, CacheError> {
        match &*self.state.read().await {
            CatalogState::Ready(pairs) => Ok(Arc::clone(pairs)),
            CatalogState::Uninitialized | CatalogState::Loading => Err(
                CacheError::NotInitialized("pairs catalog".into()),
            ),
        }
    }

    /// Every known pair, in catalog order.
    pub async fn get_all_pairs(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.snapshot().await?.as_ref().clone())
    }

    pub async fn contains(&self, pair: &str) -> Result<bool, CacheError> {
        Ok(self.snapshot().await?.iter().any(|p| p == pair))
    }

    /// Number of pairs, or 0 before the first load.
    pub async fn count(&self) -> usize {
        self.snapshot().await.map(|p| p.len()).unwrap_or(0)
    }

    pub async fn is_ready(&self) -> bool {
        matches!(&*self.state.read().await, CatalogState::Ready(_))
    }
}

#[async_trait]
impl Refreshable for PairsCatalog {
    fn label(&self) -> &str {
        "pairs"
    }

    async fn refresh(&self) {
        match self.refresh_catalog().await {
            Ok(count) => info!(pairs = count, "Pairs catalog refreshed"),
            Err(e) => warn!(error = %e, "Pairs refresh failed, keeping previous list"),
        }
    }
}
