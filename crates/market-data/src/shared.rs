//! In-process shared tier with per-entry TTL.

use async_trait::async_trait;
use market_core::error::StoreError;
use market_core::traits::SharedCache;
use market_core::types::{AnalysisResult, CacheKey};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry {
    result: AnalysisResult,
    expires_at: Instant,
}

/// TTL key-value tier kept in process memory.
///
/// Used when no networked cache is configured. Expired entries read as
/// absent and are evicted on the next write.
#[derive(Default)]
pub struct MemorySharedCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
}

impl MemorySharedCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SharedCache for MemorySharedCache {
    async fn set(
        &self,
        key: &CacheKey,
        result: &AnalysisResult,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| StoreError::Backend(format!("TTL of {}s is out of range", ttl.as_secs())))?;
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            key.clone(),
            Entry {
                result: result.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<AnalysisResult>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.result.clone()))
    }
}
