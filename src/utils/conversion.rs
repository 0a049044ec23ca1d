//! Type conversion and decimal arithmetic helpers.
//!
//! Every on-chain integer enters the decimal domain through one of the checked
//! conversions below, and every decimal operation in the valuation pipeline is
//! rounded with the same [`MATH_CONTEXT`].

use alloy::primitives::U256;
use bigdecimal::{BigDecimal, Context, RoundingMode};
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use once_cell::sync::Lazy;
use std::num::NonZeroU64;

use crate::valuation::ValuationError;

// ============================================
// Precision
// ============================================

/// Significant digits carried through the whole valuation pipeline.
pub const DECIMAL_PRECISION: u64 = 50;

const PRECISION: NonZeroU64 = match NonZeroU64::new(DECIMAL_PRECISION) {
    Some(p) => p,
    None => panic!("decimal precision must be non-zero"),
};

/// Shared arithmetic context: 50 significant digits, half-up rounding.
pub static MATH_CONTEXT: Lazy<Context> =
    Lazy::new(|| Context::new(PRECISION, RoundingMode::HalfUp));

/// Largest decimals value accepted for a token (10^77 still fits in U256).
pub const MAX_TOKEN_DECIMALS: u8 = 77;

// ============================================
// Rounded Arithmetic
// ============================================

/// Round a value to [`DECIMAL_PRECISION`] significant digits.
///
/// Values that already fit are returned untouched so that short numbers keep
/// their natural scale.
pub fn round_ctx(value: BigDecimal) -> BigDecimal {
    if value.digits() > DECIMAL_PRECISION {
        MATH_CONTEXT.round_decimal(value)
    } else {
        value
    }
}

/// `a * b` rounded in the shared context.
pub fn mul(a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
    round_ctx(a * b)
}

/// `a / b` rounded in the shared context, or `None` when `b` is zero.
pub fn checked_div(a: &BigDecimal, b: &BigDecimal) -> Option<BigDecimal> {
    if b.is_zero() {
        return None;
    }
    Some(round_ctx(a / b))
}

/// `1 / value` in the shared context, or `None` when `value` is zero.
pub fn reciprocal(value: &BigDecimal) -> Option<BigDecimal> {
    if value.is_zero() {
        return None;
    }
    Some(value.inverse_with_context(&MATH_CONTEXT))
}

// ============================================
// Integer Conversions
// ============================================

/// Convert a U256 into an exact BigDecimal via its little-endian bytes.
pub fn u256_to_big_decimal(value: U256) -> BigDecimal {
    let bytes: [u8; 32] = value.to_le_bytes();
    BigDecimal::from(BigInt::from_bytes_le(Sign::Plus, &bytes))
}

/// Convert a u128 (liquidity, fee amounts) into an exact BigDecimal.
pub fn u128_to_big_decimal(value: u128) -> BigDecimal {
    BigDecimal::from(value)
}

/// Check that a raw value fits into `bits` bits before it is treated as such.
///
/// The error never echoes the value itself.
pub fn ensure_bit_width(value: U256, bits: usize, field: &'static str) -> Result<U256, ValuationError> {
    if value.bit_len() > bits {
        return Err(ValuationError::InvalidInput(format!(
            "{field} exceeds {bits} bits"
        )));
    }
    Ok(value)
}

/// Divide a raw token amount by `10^decimals`.
pub fn scale_by_decimals(raw: &BigDecimal, decimals: u8) -> BigDecimal {
    if decimals == 0 {
        return raw.clone();
    }
    round_ctx(raw / big_pow10(decimals))
}

// ============================================
// Formatting
// ============================================

/// Fixed-point rendering with `places` fractional digits, rounded half-up.
pub fn to_fixed(value: &BigDecimal, places: i64) -> String {
    value
        .with_scale_round(places, RoundingMode::HalfUp)
        .to_plain_string()
}

// ============================================
// Internal Helpers
// ============================================

static POW10_CACHE: Lazy<[BigDecimal; 25]> =
    Lazy::new(|| std::array::from_fn(|i| BigDecimal::from(BigInt::from(10u32).pow(i as u32))));

/// Compute 10^exp as BigDecimal.
pub(crate) fn big_pow10(exp: u8) -> BigDecimal {
    if (exp as usize) < POW10_CACHE.len() {
        POW10_CACHE[exp as usize].clone()
    } else {
        BigDecimal::from(BigInt::from(10u32).pow(exp as u32))
    }
}
