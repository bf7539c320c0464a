//! Upstream sources and storage tiers for the analysis cache.

mod binance;
mod csv_source;
mod pairs_file;
mod redis_cache;
mod shared;
mod snapshot_file;

pub use binance::{BinanceConfig, BinanceSource, DEFAULT_BASE_URL};
pub use csv_source::CsvCandleSource;
pub use pairs_file::JsonPairsStore;
pub use redis_cache::RedisSharedCache;
pub use shared::MemorySharedCache;
pub use snapshot_file::JsonLinesSnapshotStore;
