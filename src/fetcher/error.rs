use thiserror::Error;

use crate::valuation::ValuationError;

/// Failures of one `/analyze` request.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Unsupported chain/protocol: {chain}/{protocol}")]
    UnsupportedProtocol { chain: String, protocol: String },

    #[error("Missing required parameters: chain, protocol, tokenId")]
    MissingParameters,

    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    /// RPC failure, timeout or unexpected contract response.
    #[error("{0}")]
    Upstream(#[from] anyhow::Error),
}

impl AnalyzeError {
    /// Whether the request itself is at fault rather than the chain.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AnalyzeError::Upstream(_))
    }
}
