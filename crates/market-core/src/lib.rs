//! Core types and traits for the market-data analysis cache.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Candle, Timeframe)
//! - Derived analysis types (TechnicalIndicators, AnalysisResult, CacheKey)
//! - Collaborator traits for upstream sources and storage tiers
//! - The error taxonomy shared by every layer

pub mod types;
pub mod traits;
pub mod error;

pub use error::{CacheError, CacheResult};
pub use types::*;
pub use traits::*;
