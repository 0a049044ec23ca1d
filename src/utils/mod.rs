//! Numeric utilities for position valuation.
//!
//! This module is organized into focused submodules:
//!
//! - [`conversion`] - Checked integer to decimal conversions, shared rounding context
//! - [`tick_math`] - Tick to square-root price conversion
//! - [`price`] - sqrtPriceX96 and decimal-corrected price conversion

mod conversion;
mod price;
mod tick_math;

// ============================================
// Re-exports
// ============================================

// Conversion utilities
pub use conversion::{
    checked_div, ensure_bit_width, mul, reciprocal, round_ctx, scale_by_decimals, to_fixed,
    u128_to_big_decimal, u256_to_big_decimal, DECIMAL_PRECISION, MATH_CONTEXT,
    MAX_TOKEN_DECIMALS,
};

// Price conversion utilities
pub use price::{
    price_from_sqrt_price, sqrt_price_from_x96, sqrt_price_x96_to_adjusted_price,
    validate_sqrt_price_x96,
};

// Tick math utilities
pub use tick_math::{sqrt_price_from_tick, validate_tick, MAX_TICK, MIN_TICK};
