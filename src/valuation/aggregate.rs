//! USD aggregation and profit/loss against a cost basis.

use bigdecimal::BigDecimal;

use super::{error::ValuationError, orientation::Orientation};
use crate::utils::{checked_div, mul, round_ctx};

/// Principal and fees per asset, in whole tokens.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Holdings {
    pub stable_principal: BigDecimal,
    pub volatile_principal: BigDecimal,
    pub stable_fee: BigDecimal,
    pub volatile_fee: BigDecimal,
}

impl Holdings {
    /// Arrange token0/token1 principal and fees by the resolved orientation.
    pub fn from_token_amounts(
        orientation: &Orientation,
        principal: (BigDecimal, BigDecimal),
        fees: (BigDecimal, BigDecimal),
    ) -> Self {
        let (stable_principal, volatile_principal) = orientation.split(principal.0, principal.1);
        let (stable_fee, volatile_fee) = orientation.split(fees.0, fees.1);
        Self {
            stable_principal,
            volatile_principal,
            stable_fee,
            volatile_fee,
        }
    }

    /// `stableFee + volatileFee · price`
    pub fn fee_value_usd(&self, price_volatile_usd: &BigDecimal) -> BigDecimal {
        round_ctx(&self.stable_fee + mul(&self.volatile_fee, price_volatile_usd))
    }

    /// `stablePrincipal + stableFee + (volatilePrincipal + volatileFee) · price`
    pub fn total_value_usd(&self, price_volatile_usd: &BigDecimal) -> BigDecimal {
        let volatile_total = round_ctx(&self.volatile_principal + &self.volatile_fee);
        let stable_total = round_ctx(&self.stable_principal + &self.stable_fee);
        round_ctx(stable_total + mul(&volatile_total, price_volatile_usd))
    }
}

/// Profit and loss against the amount originally put into the position.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitAndLoss {
    pub cost_usd: BigDecimal,
    pub pnl_usd: BigDecimal,
    /// `None` when the cost basis is zero.
    pub roi_percent: Option<BigDecimal>,
}

impl ProfitAndLoss {
    pub fn new(total_value_usd: &BigDecimal, cost_usd: BigDecimal) -> Self {
        let pnl_usd = round_ctx(total_value_usd - &cost_usd);
        let roi_percent = roi_percent(&pnl_usd, &cost_usd).ok();
        Self {
            cost_usd,
            pnl_usd,
            roi_percent,
        }
    }
}

/// `pnl / cost · 100`
pub fn roi_percent(
    pnl_usd: &BigDecimal,
    cost_usd: &BigDecimal,
) -> Result<BigDecimal, ValuationError> {
    let ratio = checked_div(pnl_usd, cost_usd).ok_or(ValuationError::UndefinedRatio)?;
    Ok(mul(&ratio, &BigDecimal::from(100)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{to_fixed, DECIMAL_PRECISION};
    use crate::valuation::orientation::{StableSet, TokenIndex};
    use alloy::primitives::Address;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn stable_token0() -> Orientation {
        let token0 = Address::repeat_byte(0x11);
        let token1 = Address::repeat_byte(0x22);
        Orientation::resolve(&token0, &token1, &[token0].into_iter().collect::<StableSet>())
    }

    #[test]
    fn test_pnl_and_roi() {
        let pnl = ProfitAndLoss::new(&dec("1100"), dec("1000"));
        assert_eq!(pnl.pnl_usd, dec("100"));
        assert_eq!(to_fixed(pnl.roi_percent.as_ref().unwrap(), 4), "10.0000");
    }

    #[test]
    fn test_negative_pnl() {
        let pnl = ProfitAndLoss::new(&dec("750.5"), dec("1000"));
        assert_eq!(to_fixed(&pnl.pnl_usd, 8), "-249.50000000");
        assert_eq!(to_fixed(pnl.roi_percent.as_ref().unwrap(), 4), "-24.9500");
    }

    #[test]
    fn test_zero_cost_has_no_roi() {
        let pnl = ProfitAndLoss::new(&dec("42"), dec("0"));
        assert_eq!(pnl.pnl_usd, dec("42"));
        assert_eq!(pnl.roi_percent, None);
        assert_eq!(
            roi_percent(&dec("42"), &dec("0")),
            Err(ValuationError::UndefinedRatio)
        );
    }

    #[test]
    fn test_holdings_follow_orientation() {
        let orientation = stable_token0();
        assert_eq!(orientation.stable, TokenIndex::Token0);
        let holdings = Holdings::from_token_amounts(
            &orientation,
            (dec("500"), dec("2")),
            (dec("1.5"), dec("0.01")),
        );
        assert_eq!(holdings.stable_principal, dec("500"));
        assert_eq!(holdings.volatile_principal, dec("2"));
        assert_eq!(holdings.stable_fee, dec("1.5"));
        assert_eq!(holdings.volatile_fee, dec("0.01"));
    }

    #[test]
    fn test_fee_and_total_value() {
        let holdings = Holdings {
            stable_principal: dec("500"),
            volatile_principal: dec("2"),
            stable_fee: dec("1.5"),
            volatile_fee: dec("0.01"),
        };
        let price = dec("250");
        assert_eq!(holdings.fee_value_usd(&price), dec("4"));
        // 500 + 1.5 + 2.01 * 250
        assert_eq!(holdings.total_value_usd(&price), dec("1004"));
    }

    #[test]
    fn test_sums_stay_within_precision() {
        // 1e30 + 1e-30 needs 61 significant digits unrounded
        let holdings = Holdings {
            stable_principal: dec("1e30"),
            volatile_principal: BigDecimal::default(),
            stable_fee: dec("1e30"),
            volatile_fee: dec("1e-30"),
        };
        let price = BigDecimal::from(1);
        assert!(holdings.fee_value_usd(&price).digits() <= DECIMAL_PRECISION);
        assert!(holdings.total_value_usd(&price).digits() <= DECIMAL_PRECISION);

        let pnl = ProfitAndLoss::new(&dec("1e30"), dec("-1e-30"));
        assert!(pnl.pnl_usd.digits() <= DECIMAL_PRECISION);
        assert_eq!(pnl.pnl_usd, dec("1e30"));
    }
}
