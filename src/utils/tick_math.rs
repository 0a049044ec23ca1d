//! Tick math for Uniswap V3 style pools.
//!
//! Maps tick indices to square-root prices in the shared decimal domain.
//! Unlike TickMath.sol this does not produce a Q64.96 integer: the result is
//! `1.0001^(tick/2)` carried at [`DECIMAL_PRECISION`](super::DECIMAL_PRECISION)
//! significant digits.

use bigdecimal::BigDecimal;
use once_cell::sync::Lazy;
use std::str::FromStr;

use super::conversion::MATH_CONTEXT;
use crate::valuation::ValuationError;

// ============================================
// Constants
// ============================================

/// Lowest tick a V3 pool can reach.
pub const MIN_TICK: i32 = -887272;

/// Highest tick a V3 pool can reach.
pub const MAX_TICK: i32 = 887272;

/// sqrt(1.0001), 80 significant digits.
const SQRT_TICK_BASE_LITERAL: &str =
    "1.0000499987500624960940234169937986972154989506568647884368700658421919699227777";

static SQRT_TICK_BASE: Lazy<BigDecimal> =
    Lazy::new(|| BigDecimal::from_str(SQRT_TICK_BASE_LITERAL).expect("valid decimal literal"));

// ============================================
// Tick to Price Conversion
// ============================================

/// Square-root price at `tick`: `1.0001^(tick/2)`.
///
/// Computed as `sqrt(1.0001)^tick` so odd ticks need no fractional exponent.
/// Negative ticks invert inside the power routine at double width before the
/// final rounding.
pub fn sqrt_price_from_tick(tick: i32) -> BigDecimal {
    SQRT_TICK_BASE.powi_with_context(i64::from(tick), &MATH_CONTEXT)
}

/// Reject ticks outside `[MIN_TICK, MAX_TICK]`.
pub fn validate_tick(tick: i32, field: &'static str) -> Result<i32, ValuationError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(ValuationError::InvalidInput(format!(
            "{field} is outside the supported tick range"
        )));
    }
    Ok(tick)
}
