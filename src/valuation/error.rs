use serde::Serialize;
use thiserror::Error;

/// Failures of the valuation core.
///
/// All of these are local to a single call; nothing is retried and no state
/// needs to be rolled back. Messages never carry raw on-chain integers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValuationError {
    /// A snapshot field is malformed or out of its on-chain domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// ROI was requested against a zero cost basis.
    #[error("ROI is undefined for a zero cost basis")]
    UndefinedRatio,
}

/// Non-fatal conditions attached to a valuation.
///
/// The result is still produced, but a reader should know that part of it
/// rests on a default rather than a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// Neither token is a known stablecoin; token0 was used as the USD proxy.
    NoStablecoinIdentified,
    /// Both tokens are known stablecoins; token0 was used as the USD proxy.
    AmbiguousStablecoin,
    /// `tickLower == tickUpper`; principal is reported as zero.
    DegenerateRange,
    /// A cost basis of zero was supplied; ROI is null.
    UndefinedRoi,
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Advisory::NoStablecoinIdentified => "No stablecoin identified",
            Advisory::AmbiguousStablecoin => "Both tokens are stablecoins",
            Advisory::DegenerateRange => "Zero-width tick range",
            Advisory::UndefinedRoi => "ROI undefined for zero cost basis",
        };
        f.write_str(text)
    }
}
