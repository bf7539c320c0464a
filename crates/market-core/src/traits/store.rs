//! Storage tier traits.

use crate::error::StoreError;
use crate::types::{AnalysisResult, CacheKey};
use async_trait::async_trait;
use std::time::Duration;

/// Durable snapshot tier: survives restarts, overwritten rather than versioned.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Save a result, replacing any previous value for the same key.
    async fn save(&self, key: &CacheKey, result: &AnalysisResult) -> Result<(), StoreError>;

    /// Load one result. A missing key is `Ok(None)`.
    async fn load(&self, key: &CacheKey) -> Result<Option<AnalysisResult>, StoreError>;

    /// Load every stored result.
    async fn load_all(&self) -> Result<Vec<AnalysisResult>, StoreError>;
}

/// Optional shared tier with per-entry TTL.
///
/// Expired entries must be reported exactly like missing ones.
#[async_trait]
pub trait SharedCache: Send + Sync {
    async fn set(
        &self,
        key: &CacheKey,
        result: &AnalysisResult,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    async fn get(&self, key: &CacheKey) -> Result<Option<AnalysisResult>, StoreError>;
}

/// Durable tier for the flat pairs catalog.
#[async_trait]
pub trait PairsStore: Send + Sync {
    async fn save(&self, pairs: &[String]) -> Result<(), StoreError>;

    async fn load(&self) -> Result<Vec<String>, StoreError>;
}
