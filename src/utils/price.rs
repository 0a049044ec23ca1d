//! Price conversion utilities for Uniswap V3 pools.
//!
//! Converts `sqrtPriceX96` values into the decimal domain and turns
//! square-root prices into decimal-corrected token1-per-token0 prices.

use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use once_cell::sync::Lazy;

use super::conversion::{big_pow10, ensure_bit_width, mul, round_ctx, u256_to_big_decimal};
use crate::valuation::ValuationError;

// ============================================
// Constants
// ============================================

/// 2^96 (Q64.96 fixed point scaling factor), exact.
static Q96: Lazy<BigDecimal> = Lazy::new(|| u256_to_big_decimal(U256::from(1u64) << 96));

// ============================================
// sqrtPriceX96 to Price Conversion
// ============================================

/// `sqrtPriceX96 / 2^96` at full decimal precision.
pub fn sqrt_price_from_x96(sqrt_price_x96: U256) -> BigDecimal {
    round_ctx(u256_to_big_decimal(sqrt_price_x96) / &*Q96)
}

/// Validate a raw slot0 square-root price: non-zero and at most 160 bits.
pub fn validate_sqrt_price_x96(sqrt_price_x96: U256) -> Result<U256, ValuationError> {
    if sqrt_price_x96.is_zero() {
        return Err(ValuationError::InvalidInput(
            "sqrtPriceX96 must be non-zero".to_string(),
        ));
    }
    ensure_bit_width(sqrt_price_x96, 160, "sqrtPriceX96")
}

/// Decimal-corrected price from a square-root price.
///
/// `sqrtP^2` is token1 per token0 in raw units; multiplying by
/// `10^decimals0 / 10^decimals1` expresses it in whole tokens.
pub fn price_from_sqrt_price(
    sqrt_price: &BigDecimal,
    token0_decimals: u8,
    token1_decimals: u8,
) -> BigDecimal {
    let raw_price = mul(sqrt_price, sqrt_price);
    let scaled = mul(&raw_price, &big_pow10(token0_decimals));
    round_ctx(scaled / big_pow10(token1_decimals))
}

/// Convenience: slot0 `sqrtPriceX96` straight to a decimal-corrected price.
pub fn sqrt_price_x96_to_adjusted_price(
    sqrt_price_x96: U256,
    token0_decimals: u8,
    token1_decimals: u8,
) -> BigDecimal {
    price_from_sqrt_price(
        &sqrt_price_from_x96(sqrt_price_x96),
        token0_decimals,
        token1_decimals,
    )
}
