pub mod abis;
pub mod config;
pub mod fetcher;
pub mod server;
pub mod utils;
pub mod valuation;

pub use crate::config::Settings;
pub use fetcher::{AnalyzeError, AnalyzeRequest, MetadataCache, SnapshotFetcher};
pub use server::AppState;
pub use valuation::{PositionReport, ValuationError, ValuationResult, Valuator};
