use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::{
    aggregate::{Holdings, ProfitAndLoss},
    error::Advisory,
    orientation::{Orientation, PriceRange},
    range::RangeStatus,
};

/// Position-manager state for one NFT position.
///
/// Ticks are int24 on-chain and stored as i32; the fee tier is uint24.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSnapshot {
    pub token_id: U256,
    pub token0: Address,
    pub token1: Address,
    pub fee_tier: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
}

/// Pool `slot0` state read alongside the fee simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub address: Address,
    /// Current √P in Q64.96 (uint160 on-chain).
    pub sqrt_price_x96: U256,
    pub current_tick: i32,
}

/// Fees owed to the position according to a simulated full `collect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeSnapshot {
    pub amount0: u128,
    pub amount1: u128,
}

/// ERC-20 metadata needed for decimal normalization and display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    pub decimals: u8,
    pub symbol: String,
}

impl TokenMeta {
    pub fn new(decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            decimals,
            symbol: symbol.into(),
        }
    }
}

/// Full-precision valuation of a position.
///
/// Every decimal here is unrounded beyond the shared 50-digit context;
/// display rounding happens in [`PositionReport`](super::PositionReport).
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationResult {
    pub token_id: U256,
    pub pool: Address,
    pub range_status: RangeStatus,
    pub in_range: bool,
    pub orientation: Orientation,
    pub stable_symbol: String,
    pub volatile_symbol: String,
    /// Range bounds in stable units per volatile unit.
    pub price_range: PriceRange,
    /// Unit USD price of the volatile asset.
    pub price_volatile_usd: BigDecimal,
    pub holdings: Holdings,
    pub fee_value_usd: BigDecimal,
    pub total_value_usd: BigDecimal,
    pub pnl: Option<ProfitAndLoss>,
    pub warnings: Vec<Advisory>,
}
