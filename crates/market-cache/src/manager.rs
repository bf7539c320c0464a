//! Hot-tier cache of analysis results.

use async_trait::async_trait;
use futures::future::join_all;
use market_core::error::{CacheError, SourceError};
use market_core::traits::{CandleSource, SharedCache, SnapshotStore};
use market_core::types::{is_ordered, AnalysisResult, CacheKey};
use market_indicators::calculate_indicators;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::bounded::{source_call, store_call};
use crate::scheduler::Refreshable;
use crate::settings::CacheSettings;

/// Outcome of one refresh pass over the tracked grid.
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    pub succeeded: Vec<CacheKey>,
    pub failed: Vec<(CacheKey, String)>,
}

impl RefreshReport {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Summary of the hot tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub oldest_computed_at: Option<i64>,
    pub newest_computed_at: Option<i64>,
}

/// Owns the authoritative (pair, timeframe) -> [`AnalysisResult`] map.
///
/// Reads only ever touch the in-memory map. Fetching, computing and
/// persisting happen without the lock; the write lock is held just long
/// enough to swap in a finished `Arc`.
pub struct CacheManager {
    entries: RwLock<HashMap<CacheKey, Arc<AnalysisResult>>>,
    source: Arc<dyn CandleSource>,
    durable: Arc<dyn SnapshotStore>,
    shared: Option<Arc<dyn SharedCache>>,
    settings: CacheSettings,
}

impl CacheManager {
    pub fn new(
        source: Arc<dyn CandleSource>,
        durable: Arc<dyn SnapshotStore>,
        shared: Option<Arc<dyn SharedCache>>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            source,
            durable,
            shared,
            settings,
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Look up a key. Never fetches.
    pub async fn get(&self, pair: &str, timeframe: &str) -> Option<Arc<AnalysisResult>> {
        let key = CacheKey::new(pair, timeframe);
        self.entries.read().await.get(&key).cloned()
    }

    /// Replace the value for a key.
    pub async fn put(&self, key: CacheKey, result: AnalysisResult) {
        self.publish(key, Arc::new(result)).await;
    }

    async fn publish(&self, key: CacheKey, result: Arc<AnalysisResult>) {
        self.entries.write().await.insert(key, result);
    }

    /// Cached keys, sorted.
    pub async fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        CacheStats {
            entries: entries.len(),
            oldest_computed_at: entries.values().map(|r| r.computed_at).min(),
            newest_computed_at: entries.values().map(|r| r.computed_at).max(),
        }
    }

    /// Fetch, compute, publish and persist one key.
    ///
    /// On failure the previous value (if any) stays in place.
    pub async fn refresh_key(&self, key: &CacheKey) -> Result<(), CacheError> {
        let mut candles = source_call(
            self.settings.fetch_timeout,
            self.source
                .fetch_candles(&key.pair, &key.timeframe, self.settings.candle_limit),
        )
        .await?;

        if candles.is_empty() {
            return Err(SourceError::Empty {
                pair: key.pair.clone(),
                timeframe: key.timeframe.clone(),
            }
            .into());
        }

        if !is_ordered(&candles) {
            warn!(key = %key, source = self.source.name(), "Candles arrived out of order, sorting by open time");
            candles.sort_by_key(|c| c.open_time);
        }

        let indicators = calculate_indicators(&candles);
        let result = Arc::new(AnalysisResult::new(key, candles, indicators));
        self.publish(key.clone(), Arc::clone(&result)).await;

        debug!(key = %key, candles = result.candles.len(), rsi = result.indicators.rsi, "Key refreshed");
        self.persist(key, &result).await;
        Ok(())
    }

    /// Best-effort write to the durable and shared tiers.
    async fn persist(&self, key: &CacheKey, result: &AnalysisResult) {
        if let Err(e) = store_call(self.settings.store_timeout, self.durable.save(key, result)).await {
            warn!(key = %key, error = %e, "Durable save failed");
        }
        self.mirror_to_shared(key, result).await;
    }

    async fn mirror_to_shared(&self, key: &CacheKey, result: &AnalysisResult) {
        if let Some(shared) = &self.shared {
            let ttl = self.settings.shared_ttl;
            if let Err(e) = store_call(self.settings.store_timeout, shared.set(key, result, ttl)).await {
                warn!(key = %key, error = %e, "Shared cache set failed");
            }
        }
    }

    /// Refresh every tracked key concurrently; one failure never stops the others.
    pub async fn refresh_all(&self) -> RefreshReport {
        let keys = self.settings.tracked_keys();
        let outcomes = join_all(keys.iter().map(|key| self.refresh_key(key))).await;

        let mut report = RefreshReport::default();
        for (key, outcome) in keys.into_iter().zip(outcomes) {
            match outcome {
                Ok(()) => report.succeeded.push(key),
                Err(e) => {
                    warn!(key = %key, error = %e, "Refresh failed, keeping previous value");
                    report.failed.push((key, e.to_string()));
                }
            }
        }
        report
    }

    /// Fill the hot tier from the durable tier, then the shared tier for gaps.
    ///
    /// Load failures are logged, never fatal. Returns the number of keys loaded.
    pub async fn warm_from_store(&self) -> usize {
        let tracked = self.settings.tracked_keys();

        let stored = match store_call(self.settings.store_timeout, self.durable.load_all()).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Durable snapshot load failed");
                Vec::new()
            }
        };

        let mut found: HashMap<CacheKey, AnalysisResult> = stored
            .into_iter()
            .filter_map(|r| {
                let key = r.key();
                if tracked.contains(&key) {
                    Some((key, r))
                } else {
                    debug!(key = %key, "Ignoring untracked snapshot entry");
                    None
                }
            })
            .collect();

        if let Some(shared) = &self.shared {
            let missing: Vec<CacheKey> = tracked
                .iter()
                .filter(|k| !found.contains_key(*k))
                .cloned()
                .collect();
            for key in missing {
                match store_call(self.settings.store_timeout, shared.get(&key)).await {
                    Ok(Some(result)) => {
                        found.insert(key, result);
                    }
                    Ok(None) => warn!(key = %key, "No stored snapshot for key"),
                    Err(e) => warn!(key = %key, error = %e, "Shared cache load failed"),
                }
            }
        }

        let loaded = found.len();
        for (key, result) in found {
            let result = Arc::new(result);
            self.publish(key.clone(), Arc::clone(&result)).await;
            self.mirror_to_shared(&key, &result).await;
        }

        info!(loaded, tracked = tracked.len(), "Hot tier warmed from storage");
        loaded
    }
}

#[async_trait]
impl Refreshable for CacheManager {
    fn label(&self) -> &str {
        "analysis"
    }

    async fn refresh(&self) {
        let report = self.refresh_all().await;
        let entries = self.len().await;
        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            entries,
            "Analysis refresh tick complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{candles, result_for, Script, ScriptedSource};
    use market_data::{JsonLinesSnapshotStore, MemorySharedCache};
    use std::time::Duration;

    fn settings() -> CacheSettings {
        CacheSettings {
            pairs: vec!["BTCUSDT".into(), "ETHUSDT".into()],
            timeframes: vec!["1h".into()],
            candle_limit: 100,
            fetch_timeout: Duration::from_secs(2),
            store_timeout: Duration::from_secs(2),
            ..Default::default()
        }
    }

    fn manager(
        source: Arc<ScriptedSource>,
        dir: &tempfile::TempDir,
        shared: Option<Arc<MemorySharedCache>>,
    ) -> CacheManager {
        let durable = Arc::new(JsonLinesSnapshotStore::new(dir.path().join("analysis.jsonl")));
        CacheManager::new(
            source,
            durable,
            shared.map(|s| s as Arc<dyn SharedCache>),
            settings(),
        )
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = manager(Arc::new(ScriptedSource::new()), &dir, None);
        let value = result_for("BTCUSDT", "1h", 120);

        cache.put(CacheKey::new("BTCUSDT", "1h"), value.clone()).await;

        let got = cache.get("BTCUSDT", "1h").await.unwrap();
        assert_eq!(*got, value);
        assert!(cache.get("BTCUSDT", "5m").await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_all_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(ScriptedSource::new());
        source.script("BTCUSDT", "1h", Script::Candles(candles(80, 100.0)));
        source.script("ETHUSDT", "1h", Script::Fail);
        let cache = manager(Arc::clone(&source), &dir, None);

        let report = cache.refresh_all().await;

        assert_eq!(report.succeeded, vec![CacheKey::new("BTCUSDT", "1h")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.attempted(), 2);
        assert!(cache.get("BTCUSDT", "1h").await.is_some());
        assert!(cache.get("ETHUSDT", "1h").await.is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_stale_value() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(ScriptedSource::new());
        source.script("BTCUSDT", "1h", Script::Candles(candles(80, 100.0)));
        let cache = manager(Arc::clone(&source), &dir, None);
        let key = CacheKey::new("BTCUSDT", "1h");

        cache.refresh_key(&key).await.unwrap();
        let before = cache.get("BTCUSDT", "1h").await.unwrap();

        source.script("BTCUSDT", "1h", Script::Fail);
        assert!(cache.refresh_key(&key).await.is_err());

        let after = cache.get("BTCUSDT", "1h").await.unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn test_empty_fetch_is_soft_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(ScriptedSource::new());
        source.script("BTCUSDT", "1h", Script::Candles(vec![]));
        let cache = manager(source, &dir, None);

        let err = cache.refresh_key(&CacheKey::new("BTCUSDT", "1h")).await.unwrap_err();
        assert!(matches!(err, CacheError::Upstream(SourceError::Empty { .. })));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_scheduled_refresh_runs_on_spawned_task() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(ScriptedSource::new());
        source.script("BTCUSDT", "1h", Script::Candles(candles(60, 100.0)));
        source.script("ETHUSDT", "1h", Script::Candles(candles(60, 200.0)));
        let cache = Arc::new(manager(Arc::clone(&source), &dir, None));

        let job = Arc::clone(&cache);
        tokio::spawn(async move { job.refresh().await }).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_out_of_order_candles_are_sorted_before_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(ScriptedSource::new());
        let ordered = candles(60, 100.0);
        let mut shuffled = ordered.clone();
        shuffled.reverse();
        shuffled.swap(3, 40);
        source.script("BTCUSDT", "1h", Script::Candles(shuffled));
        let cache = manager(source, &dir, None);

        cache.refresh_key(&CacheKey::new("BTCUSDT", "1h")).await.unwrap();

        let got = cache.get("BTCUSDT", "1h").await.unwrap();
        assert!(is_ordered(&got.candles));
        assert_eq!(got.candles, ordered);
        assert_eq!(got.indicators, calculate_indicators(&ordered));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_fetch_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(ScriptedSource::new());
        source.script("BTCUSDT", "1h", Script::Hang);
        let cache = manager(source, &dir, None);

        let err = cache.refresh_key(&CacheKey::new("BTCUSDT", "1h")).await.unwrap_err();
        assert!(matches!(err, CacheError::Upstream(SourceError::Timeout { after_secs: 2 })));
    }

    #[tokio::test]
    async fn test_refresh_persists_to_both_tiers() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(ScriptedSource::new());
        source.script("BTCUSDT", "1h", Script::Candles(candles(60, 50.0)));
        let shared = Arc::new(MemorySharedCache::new());
        let cache = manager(source, &dir, Some(Arc::clone(&shared)));
        let key = CacheKey::new("BTCUSDT", "1h");

        cache.refresh_key(&key).await.unwrap();
        let hot = cache.get("BTCUSDT", "1h").await.unwrap();

        let durable = JsonLinesSnapshotStore::new(dir.path().join("analysis.jsonl"));
        assert_eq!(durable.load(&key).await.unwrap().as_ref(), Some(hot.as_ref()));
        assert_eq!(shared.get(&key).await.unwrap().as_ref(), Some(hot.as_ref()));
    }

    #[tokio::test]
    async fn test_warm_from_store_loads_tracked_keys_only() {
        let dir = tempfile::tempdir().unwrap();
        let durable = JsonLinesSnapshotStore::new(dir.path().join("analysis.jsonl"));
        let btc = result_for("BTCUSDT", "1h", 60);
        durable.save(&btc.key(), &btc).await.unwrap();
        let stray = result_for("DOGEUSDT", "1h", 60);
        durable.save(&stray.key(), &stray).await.unwrap();

        let shared = Arc::new(MemorySharedCache::new());
        let eth = result_for("ETHUSDT", "1h", 60);
        shared.set(&eth.key(), &eth, Duration::from_secs(60)).await.unwrap();

        let source = Arc::new(ScriptedSource::new());
        let cache = manager(Arc::clone(&source), &dir, Some(Arc::clone(&shared)));

        assert_eq!(cache.warm_from_store().await, 2);
        assert_eq!(*cache.get("BTCUSDT", "1h").await.unwrap(), btc);
        assert_eq!(*cache.get("ETHUSDT", "1h").await.unwrap(), eth);
        assert!(cache.get("DOGEUSDT", "1h").await.is_none());
        assert_eq!(source.calls(), 0);

        // loaded entries are mirrored into the shared tier
        assert!(shared.get(&btc.key()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_warm_from_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = manager(Arc::new(ScriptedSource::new()), &dir, None);

        assert_eq!(cache.warm_from_store().await, 0);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_stats() {
        let dir = tempfile::tempdir().unwrap();
        let cache = manager(Arc::new(ScriptedSource::new()), &dir, None);
        assert_eq!(cache.stats().await, CacheStats::default());

        let mut a = result_for("BTCUSDT", "1h", 10);
        a.computed_at = 100;
        let mut b = result_for("ETHUSDT", "1h", 10);
        b.computed_at = 300;
        cache.put(a.key(), a).await;
        cache.put(b.key(), b).await;

        let stats = cache.stats().await;
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.oldest_computed_at, Some(100));
        assert_eq!(stats.newest_computed_at, Some(300));
        assert_eq!(
            cache.keys().await,
            vec![CacheKey::new("BTCUSDT", "1h"), CacheKey::new("ETHUSDT", "1h")]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_see_whole_values_during_swap() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(manager(Arc::new(ScriptedSource::new()), &dir, None));
        let key = CacheKey::new("BTCUSDT", "1h");

        let old = result_for("BTCUSDT", "1h", 60);
        let mut new = result_for("BTCUSDT", "1h", 90);
        new.computed_at = old.computed_at + 600;
        cache.put(key.clone(), old.clone()).await;

        let mut readers = Vec::new();
        for _ in 0..16 {
            let cache = Arc::clone(&cache);
            let (old, new) = (old.clone(), new.clone());
            readers.push(tokio::spawn(async move {
                for _ in 0..200 {
                    let seen = cache.get("BTCUSDT", "1h").await.unwrap();
                    assert!(*seen == old || *seen == new);
                    tokio::task::yield_now().await;
                }
            }));
        }

        cache.put(key, new.clone()).await;
        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(*cache.get("BTCUSDT", "1h").await.unwrap(), new);
    }
}
