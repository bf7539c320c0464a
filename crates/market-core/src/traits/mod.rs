//! Collaborator traits consumed by the cache engine.

mod indicator;
mod source;
mod store;

pub use indicator::Indicator;
pub use source::{CandleSource, PairsSource};
pub use store::{PairsStore, SharedCache, SnapshotStore};
