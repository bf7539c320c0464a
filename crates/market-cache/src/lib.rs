//! Multi-tier analysis cache.
//!
//! The [`Engine`] owns a [`CacheManager`] (pair, timeframe -> analysis) and a
//! [`PairsCatalog`], each kept fresh by its own [`RefreshScheduler`]. Reads
//! only touch the in-memory hot tier; the durable and shared tiers are
//! written best-effort and read back at startup.

mod bounded;
pub mod engine;
pub mod manager;
pub mod pairs;
pub mod scheduler;
pub mod settings;

#[cfg(test)]
mod testing;

pub use engine::{Collaborators, Engine, EngineStatus, EntryStatus};
pub use manager::{CacheManager, CacheStats, RefreshReport};
pub use pairs::{filter_pairs, CatalogLoad, PairsCatalog};
pub use scheduler::{RefreshScheduler, Refreshable};
pub use settings::{CacheSettings, CatalogSettings, EngineSettings, StartupMode};
