//! Range classification and the liquidity to principal split.
//!
//! Branch selection follows the pool's own tie-breaks: a current tick equal
//! to `tickLower` counts as below the range, equal to `tickUpper` as above.

use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::utils::{checked_div, mul};

/// Where the pool price sits relative to the position's ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeStatus {
    /// `currentTick <= tickLower`: all token0.
    BelowRange,
    /// Strictly between the bounds: both tokens.
    InRange,
    /// `currentTick >= tickUpper`: all token1.
    AboveRange,
}

impl RangeStatus {
    pub fn classify(current_tick: i32, tick_lower: i32, tick_upper: i32) -> Self {
        if current_tick <= tick_lower {
            RangeStatus::BelowRange
        } else if current_tick >= tick_upper {
            RangeStatus::AboveRange
        } else {
            RangeStatus::InRange
        }
    }
}

/// Whether the position is earning fees: `tickLower <= currentTick < tickUpper`.
///
/// Differs from [`RangeStatus::classify`] at `currentTick == tickLower`, where
/// the position is active but its principal is still all token0.
pub fn is_in_range(current_tick: i32, tick_lower: i32, tick_upper: i32) -> bool {
    tick_lower <= current_tick && current_tick < tick_upper
}

/// Square-root prices at the position bounds and at the pool's current price.
#[derive(Debug, Clone, PartialEq)]
pub struct SqrtPrices {
    pub lower: BigDecimal,
    pub upper: BigDecimal,
    pub current: BigDecimal,
}

impl SqrtPrices {
    pub fn is_degenerate(&self) -> bool {
        self.lower == self.upper
    }
}

/// Token amounts in raw units (still scaled by `10^decimals`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrincipalAmounts {
    pub amount0: BigDecimal,
    pub amount1: BigDecimal,
}

/// Split `liquidity` into token0/token1 amounts for the given branch.
pub fn principal_amounts(
    status: RangeStatus,
    liquidity: &BigDecimal,
    sqrt_prices: &SqrtPrices,
) -> PrincipalAmounts {
    if sqrt_prices.is_degenerate() {
        return PrincipalAmounts::default();
    }

    let SqrtPrices {
        lower,
        upper,
        current,
    } = sqrt_prices;

    match status {
        RangeStatus::BelowRange => PrincipalAmounts {
            amount0: amount0_between(liquidity, lower, upper),
            amount1: BigDecimal::default(),
        },
        RangeStatus::AboveRange => PrincipalAmounts {
            amount0: BigDecimal::default(),
            amount1: amount1_between(liquidity, lower, upper),
        },
        RangeStatus::InRange => {
            // slot0 tick and sqrt price can disagree by one step at a tick boundary
            let current = current.clone().clamp(lower.clone(), upper.clone());
            PrincipalAmounts {
                amount0: amount0_between(liquidity, &current, upper),
                amount1: amount1_between(liquidity, lower, &current),
            }
        },
    }
}

/// `L·(√b − √a) / (√b·√a)`
fn amount0_between(liquidity: &BigDecimal, sqrt_a: &BigDecimal, sqrt_b: &BigDecimal) -> BigDecimal {
    let numerator = mul(liquidity, &(sqrt_b - sqrt_a));
    checked_div(&numerator, &mul(sqrt_b, sqrt_a)).unwrap_or_default()
}

/// `L·(√b − √a)`
fn amount1_between(liquidity: &BigDecimal, sqrt_a: &BigDecimal, sqrt_b: &BigDecimal) -> BigDecimal {
    mul(liquidity, &(sqrt_b - sqrt_a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::sqrt_price_from_tick;
    use std::str::FromStr;

    fn sqrt_prices(tick_lower: i32, tick_upper: i32, current_tick: i32) -> SqrtPrices {
        SqrtPrices {
            lower: sqrt_price_from_tick(tick_lower),
            upper: sqrt_price_from_tick(tick_upper),
            current: sqrt_price_from_tick(current_tick),
        }
    }

    fn split(tick_lower: i32, tick_upper: i32, current_tick: i32, liquidity: u64) -> PrincipalAmounts {
        let status = RangeStatus::classify(current_tick, tick_lower, tick_upper);
        principal_amounts(
            status,
            &BigDecimal::from(liquidity),
            &sqrt_prices(tick_lower, tick_upper, current_tick),
        )
    }

    #[test]
    fn test_classify_tie_breaks() {
        assert_eq!(RangeStatus::classify(-100, -100, 100), RangeStatus::BelowRange);
        assert_eq!(RangeStatus::classify(-101, -100, 100), RangeStatus::BelowRange);
        assert_eq!(RangeStatus::classify(0, -100, 100), RangeStatus::InRange);
        assert_eq!(RangeStatus::classify(99, -100, 100), RangeStatus::InRange);
        assert_eq!(RangeStatus::classify(100, -100, 100), RangeStatus::AboveRange);
    }

    #[test]
    fn test_in_range_upper_exclusive() {
        assert!(is_in_range(-100, -100, 100));
        assert!(is_in_range(99, -100, 100));
        assert!(!is_in_range(100, -100, 100));
        assert!(!is_in_range(-101, -100, 100));
    }

    #[test]
    fn test_in_range_split_matches_closed_form() {
        let amounts = split(-100, 100, 0, 1_000_000);
        assert!(amounts.amount0 > BigDecimal::default());
        assert!(amounts.amount1 > BigDecimal::default());

        // Reference values evaluated independently at 50 digits
        let tolerance = BigDecimal::from_str("1e-30").unwrap();
        let expected0 =
            BigDecimal::from_str("4987.2720707490961335002265278445396295244841361151").unwrap();
        let expected1 =
            BigDecimal::from_str("4987.2720707490961335002265278445396295244841360800").unwrap();
        assert!((&amounts.amount0 - expected0).abs() < tolerance);
        assert!((&amounts.amount1 - expected1).abs() < tolerance);
    }

    #[test]
    fn test_above_range_is_all_token1() {
        let amounts = split(-100, 100, 200, 1_000_000);
        let liquidity = BigDecimal::from(1_000_000);
        let expected = mul(
            &liquidity,
            &(sqrt_price_from_tick(100) - sqrt_price_from_tick(-100)),
        );
        assert_eq!(amounts.amount0, BigDecimal::default());
        assert_eq!(amounts.amount1, expected);
    }

    #[test]
    fn test_below_range_is_all_token0() {
        let amounts = split(-100, 100, -200, 1_000_000);
        assert!(amounts.amount0 > BigDecimal::default());
        assert_eq!(amounts.amount1, BigDecimal::default());
    }

    #[test]
    fn test_at_lower_tick_is_all_token0() {
        let amounts = split(-100, 100, -100, 1_000_000);
        assert!(amounts.amount0 > BigDecimal::default());
        assert_eq!(amounts.amount1, BigDecimal::default());
    }

    #[test]
    fn test_zero_width_range_returns_zero() {
        let amounts = split(0, 0, 0, 1_000_000);
        assert_eq!(amounts, PrincipalAmounts::default());

        let amounts = split(500, 500, -20, 1_000_000);
        assert_eq!(amounts, PrincipalAmounts::default());
    }

    #[test]
    fn test_amounts_never_negative() {
        let zero = BigDecimal::default();
        for current in [-5000, -120, -60, -1, 0, 1, 59, 60, 61, 5000] {
            let amounts = split(-60, 60, current, 123_456_789);
            assert!(amounts.amount0 >= zero, "amount0 negative at tick {current}");
            assert!(amounts.amount1 >= zero, "amount1 negative at tick {current}");
            if !(-60..60).contains(&current) {
                assert!(
                    amounts.amount0 == zero || amounts.amount1 == zero,
                    "outside the range exactly one side must be empty (tick {current})"
                );
            }
        }
    }

    #[test]
    fn test_current_price_outside_bounds_is_clamped() {
        let status = RangeStatus::InRange;
        let prices = SqrtPrices {
            lower: sqrt_price_from_tick(-100),
            upper: sqrt_price_from_tick(100),
            current: sqrt_price_from_tick(150),
        };
        let amounts = principal_amounts(status, &BigDecimal::from(1_000_000), &prices);
        assert_eq!(amounts.amount0, BigDecimal::default());
        assert!(amounts.amount1 > BigDecimal::default());
    }
}
