//! Position valuation core.
//!
//! A pure function of one chain snapshot. Data flows strictly forward:
//!
//! 1. price conversion ([`crate::utils`]): ticks and `sqrtPriceX96` to √P
//! 2. [`range`]: branch selection and the principal split
//! 3. [`orientation`]: stable/volatile sides and display direction
//! 4. [`aggregate`]: USD totals and PnL
//!
//! Nothing here performs I/O or keeps state between calls.

pub mod aggregate;
pub mod error;
pub mod orientation;
pub mod range;
pub mod report;
pub mod types;

pub use aggregate::{roi_percent, Holdings, ProfitAndLoss};
pub use error::{Advisory, ValuationError};
pub use orientation::{Orientation, PriceRange, StableSet, TokenIndex};
pub use range::{is_in_range, principal_amounts, PrincipalAmounts, RangeStatus, SqrtPrices};
pub use report::PositionReport;
pub use types::{FeeSnapshot, PoolSnapshot, PositionSnapshot, TokenMeta, ValuationResult};

use bigdecimal::BigDecimal;
use log::debug;

use crate::utils::{
    price_from_sqrt_price, scale_by_decimals, sqrt_price_from_tick, sqrt_price_from_x96,
    u128_to_big_decimal, validate_sqrt_price_x96, validate_tick, MAX_TOKEN_DECIMALS,
};

/// Values positions for one chain's set of known stablecoins.
#[derive(Debug, Clone, Default)]
pub struct Valuator {
    stables: StableSet,
}

impl Valuator {
    pub fn new(stables: StableSet) -> Self {
        Self { stables }
    }

    pub fn stables(&self) -> &StableSet {
        &self.stables
    }

    /// Value a position from a consistent snapshot.
    ///
    /// The caller guarantees that `position`, `pool` and `fees` were read at
    /// (or close to) the same block; this is not checked.
    pub fn value_position(
        &self,
        position: &PositionSnapshot,
        pool: &PoolSnapshot,
        fees: &FeeSnapshot,
        meta0: &TokenMeta,
        meta1: &TokenMeta,
        cost_usd: Option<BigDecimal>,
    ) -> Result<ValuationResult, ValuationError> {
        validate_snapshot(position, pool, meta0, meta1)?;

        let mut warnings = Vec::new();

        // 1. Square-root prices
        let sqrt_prices = SqrtPrices {
            lower: sqrt_price_from_tick(position.tick_lower),
            upper: sqrt_price_from_tick(position.tick_upper),
            current: sqrt_price_from_x96(pool.sqrt_price_x96),
        };

        // 2. Range branch and principal
        let range_status =
            RangeStatus::classify(pool.current_tick, position.tick_lower, position.tick_upper);
        let in_range = is_in_range(pool.current_tick, position.tick_lower, position.tick_upper);
        if sqrt_prices.is_degenerate() {
            warnings.push(Advisory::DegenerateRange);
        }

        let raw = principal_amounts(
            range_status,
            &u128_to_big_decimal(position.liquidity),
            &sqrt_prices,
        );
        let principal = (
            scale_by_decimals(&raw.amount0, meta0.decimals),
            scale_by_decimals(&raw.amount1, meta1.decimals),
        );
        let fee_amounts = (
            scale_by_decimals(&u128_to_big_decimal(fees.amount0), meta0.decimals),
            scale_by_decimals(&u128_to_big_decimal(fees.amount1), meta1.decimals),
        );

        // 3. Orientation and display prices
        let orientation = Orientation::resolve(&position.token0, &position.token1, &self.stables);
        if let Some(advisory) = orientation.advisory {
            warnings.push(advisory);
        }

        let price_of = |sqrt_price: &BigDecimal| {
            price_from_sqrt_price(sqrt_price, meta0.decimals, meta1.decimals)
        };
        let price_range =
            orientation.price_range(&price_of(&sqrt_prices.lower), &price_of(&sqrt_prices.upper));
        let price_volatile_usd = orientation.unit_price(&price_of(&sqrt_prices.current));

        // 4. Aggregation
        let holdings = Holdings::from_token_amounts(&orientation, principal, fee_amounts);
        let fee_value_usd = holdings.fee_value_usd(&price_volatile_usd);
        let total_value_usd = holdings.total_value_usd(&price_volatile_usd);

        let pnl = cost_usd.map(|cost| ProfitAndLoss::new(&total_value_usd, cost));
        if matches!(&pnl, Some(p) if p.roi_percent.is_none()) {
            warnings.push(Advisory::UndefinedRoi);
        }

        let (stable_symbol, volatile_symbol) = orientation.split(&meta0.symbol, &meta1.symbol);

        debug!(
            "Valued position {}: {:?}, stable {:?}, {} warning(s)",
            position.token_id,
            range_status,
            orientation.stable,
            warnings.len()
        );

        Ok(ValuationResult {
            token_id: position.token_id,
            pool: pool.address,
            range_status,
            in_range,
            orientation,
            stable_symbol: stable_symbol.clone(),
            volatile_symbol: volatile_symbol.clone(),
            price_range,
            price_volatile_usd,
            holdings,
            fee_value_usd,
            total_value_usd,
            pnl,
            warnings,
        })
    }
}

fn validate_snapshot(
    position: &PositionSnapshot,
    pool: &PoolSnapshot,
    meta0: &TokenMeta,
    meta1: &TokenMeta,
) -> Result<(), ValuationError> {
    validate_tick(position.tick_lower, "tickLower")?;
    validate_tick(position.tick_upper, "tickUpper")?;
    validate_tick(pool.current_tick, "currentTick")?;
    if position.tick_lower > position.tick_upper {
        return Err(ValuationError::InvalidInput(
            "tickLower is above tickUpper".to_string(),
        ));
    }
    validate_sqrt_price_x96(pool.sqrt_price_x96)?;
    for (meta, field) in [(meta0, "token0"), (meta1, "token1")] {
        if meta.decimals > MAX_TOKEN_DECIMALS {
            return Err(ValuationError::InvalidInput(format!(
                "{field} decimals exceed {MAX_TOKEN_DECIMALS}"
            )));
        }
    }
    Ok(())
}
