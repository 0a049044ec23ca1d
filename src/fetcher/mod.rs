//! Chain reads feeding the valuation core.

pub mod cache;
pub mod error;
pub mod snapshot_fetcher;

pub use cache::{MetadataCache, PoolKey};
pub use error::AnalyzeError;
pub use snapshot_fetcher::{AnalyzeRequest, SnapshotFetcher};
