//! JSON response shape for a valuation.
//!
//! Field names and nesting are the public wire contract; numbers are rendered
//! as fixed-point strings here and nowhere else.

use serde::Serialize;

use super::{error::Advisory, types::ValuationResult};
use crate::utils::to_fixed;

/// Fractional digits for token amounts and USD totals.
const AMOUNT_PLACES: i64 = 8;

/// Fractional digits for unit prices and range bounds.
const PRICE_PLACES: i64 = 6;

/// Fractional digits for ROI.
const ROI_PLACES: i64 = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionReport {
    pub token_id: String,
    pub pool: String,
    pub price_usd: String,
    pub in_range: bool,
    pub range: RangeReport,
    pub holdings: HoldingsReport,
    pub total_value_usd: String,
    pub pnl_usd: Option<String>,
    pub roi_percent: Option<String>,
    pub warnings: Vec<Advisory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeReport {
    pub min_price: String,
    pub max_price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsReport {
    pub stable_symbol: String,
    pub volatile_symbol: String,
    pub liquidity: SideReport,
    pub fees: FeesReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideReport {
    pub stable: String,
    pub volatile: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesReport {
    pub stable: String,
    pub volatile: String,
    pub fee_value_usd: String,
}

impl From<&ValuationResult> for PositionReport {
    fn from(result: &ValuationResult) -> Self {
        let holdings = &result.holdings;
        Self {
            token_id: result.token_id.to_string(),
            pool: result.pool.to_checksum(None),
            price_usd: to_fixed(&result.price_volatile_usd, PRICE_PLACES),
            in_range: result.in_range,
            range: RangeReport {
                min_price: to_fixed(&result.price_range.min_price, PRICE_PLACES),
                max_price: to_fixed(&result.price_range.max_price, PRICE_PLACES),
            },
            holdings: HoldingsReport {
                stable_symbol: result.stable_symbol.clone(),
                volatile_symbol: result.volatile_symbol.clone(),
                liquidity: SideReport {
                    stable: to_fixed(&holdings.stable_principal, AMOUNT_PLACES),
                    volatile: to_fixed(&holdings.volatile_principal, AMOUNT_PLACES),
                },
                fees: FeesReport {
                    stable: to_fixed(&holdings.stable_fee, AMOUNT_PLACES),
                    volatile: to_fixed(&holdings.volatile_fee, AMOUNT_PLACES),
                    fee_value_usd: to_fixed(&result.fee_value_usd, AMOUNT_PLACES),
                },
            },
            total_value_usd: to_fixed(&result.total_value_usd, AMOUNT_PLACES),
            pnl_usd: result
                .pnl
                .as_ref()
                .map(|pnl| to_fixed(&pnl.pnl_usd, AMOUNT_PLACES)),
            roi_percent: result
                .pnl
                .as_ref()
                .and_then(|pnl| pnl.roi_percent.as_ref())
                .map(|roi| to_fixed(roi, ROI_PLACES)),
            warnings: result.warnings.clone(),
        }
    }
}
