//! Stable/volatile classification and price-direction normalization.
//!
//! On-chain prices are token1 per token0. Everything displayed is expressed as
//! stable units per volatile unit, whichever side of the pair the stablecoin
//! sits on.

use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use rustc_hash::FxHashSet;
use serde::Serialize;

use super::error::{Advisory, ValuationError};
use crate::utils::reciprocal;

/// Known USD-pegged token addresses for one chain.
///
/// Membership is by address bytes, so checksum casing never matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StableSet {
    tokens: FxHashSet<Address>,
}

impl StableSet {
    /// Parse hex addresses in any casing.
    pub fn from_hex<S: AsRef<str>>(addresses: &[S]) -> Result<Self, ValuationError> {
        addresses
            .iter()
            .map(|addr| {
                addr.as_ref().to_lowercase().parse::<Address>().map_err(|_| {
                    ValuationError::InvalidInput(format!(
                        "stablecoin address {} is not a valid address",
                        addr.as_ref()
                    ))
                })
            })
            .collect()
    }

    pub fn contains(&self, token: &Address) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<Address> for StableSet {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

/// One side of the pool's token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenIndex {
    Token0,
    Token1,
}

/// Which token is the USD proxy and which is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    pub stable: TokenIndex,
    pub volatile: TokenIndex,
    /// Set when the stable side was defaulted rather than matched.
    pub advisory: Option<Advisory>,
}

impl Orientation {
    /// Classify the pair against `stables`.
    ///
    /// Exactly one match decides the stable side. With no match, or with both
    /// tokens matching, token0 is taken as stable and an advisory is attached.
    pub fn resolve(token0: &Address, token1: &Address, stables: &StableSet) -> Self {
        match (stables.contains(token0), stables.contains(token1)) {
            (true, false) => Self::stable_token0(None),
            (false, true) => Self {
                stable: TokenIndex::Token1,
                volatile: TokenIndex::Token0,
                advisory: None,
            },
            (false, false) => Self::stable_token0(Some(Advisory::NoStablecoinIdentified)),
            (true, true) => Self::stable_token0(Some(Advisory::AmbiguousStablecoin)),
        }
    }

    fn stable_token0(advisory: Option<Advisory>) -> Self {
        Self {
            stable: TokenIndex::Token0,
            volatile: TokenIndex::Token1,
            advisory,
        }
    }

    pub fn stable_is_token0(&self) -> bool {
        self.stable == TokenIndex::Token0
    }

    /// Reorder a token0/token1 pair into `(stable, volatile)`.
    pub fn split<T>(&self, token0: T, token1: T) -> (T, T) {
        if self.stable_is_token0() {
            (token0, token1)
        } else {
            (token1, token0)
        }
    }

    /// Express a token1-per-token0 price as stable per volatile.
    ///
    /// A zero price has no reciprocal and is reported as zero.
    pub fn unit_price(&self, token1_per_token0: &BigDecimal) -> BigDecimal {
        if self.stable_is_token0() {
            reciprocal(token1_per_token0).unwrap_or_default()
        } else {
            token1_per_token0.clone()
        }
    }

    /// Display range from the prices at `tickLower` and `tickUpper`.
    ///
    /// Inverting reverses the order, so the upper tick yields the minimum when
    /// token0 is stable.
    pub fn price_range(
        &self,
        price_at_lower: &BigDecimal,
        price_at_upper: &BigDecimal,
    ) -> PriceRange {
        let (min_price, max_price) = if self.stable_is_token0() {
            (self.unit_price(price_at_upper), self.unit_price(price_at_lower))
        } else {
            (price_at_lower.clone(), price_at_upper.clone())
        };
        PriceRange::ordered(min_price, max_price)
    }
}

/// Position bounds in stable units per volatile unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRange {
    pub min_price: BigDecimal,
    pub max_price: BigDecimal,
}

impl PriceRange {
    fn ordered(a: BigDecimal, b: BigDecimal) -> Self {
        if a <= b {
            Self {
                min_price: a,
                max_price: b,
            }
        } else {
            Self {
                min_price: b,
                max_price: a,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{price_from_sqrt_price, sqrt_price_from_tick};
    use alloy::primitives::address;
    use std::str::FromStr;

    const USDT: Address = address!("55d398326f99059ff775485246999027b3197955");
    const USDC: Address = address!("8ac76a51cc950d9822d68b83fe1ad97b32cd580d");
    const WBNB: Address = address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c");
    const CAKE: Address = address!("0e09fabb73bd3ade0a17ecc321fd13a19e81ce82");

    fn bsc_stables() -> StableSet {
        StableSet::from_hex(&[
            "0x55d398326f99059ff775485246999027b3197955",
            "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d",
        ])
        .unwrap()
    }

    #[test]
    fn test_from_hex_is_case_insensitive() {
        let stables = bsc_stables();
        assert_eq!(stables.len(), 2);
        assert!(stables.contains(&USDC));
        assert!(stables.contains(&USDT));
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(StableSet::from_hex(&["0x1234"]).is_err());
    }

    #[test]
    fn test_stable_token0() {
        let orientation = Orientation::resolve(&USDT, &WBNB, &bsc_stables());
        assert_eq!(orientation.stable, TokenIndex::Token0);
        assert_eq!(orientation.volatile, TokenIndex::Token1);
        assert_eq!(orientation.advisory, None);
    }

    #[test]
    fn test_stable_token1() {
        let orientation = Orientation::resolve(&WBNB, &USDC, &bsc_stables());
        assert_eq!(orientation.stable, TokenIndex::Token1);
        assert_eq!(orientation.volatile, TokenIndex::Token0);
        assert_eq!(orientation.split("wbnb", "usdc"), ("usdc", "wbnb"));
    }

    #[test]
    fn test_no_stable_defaults_to_token0() {
        let orientation = Orientation::resolve(&WBNB, &CAKE, &bsc_stables());
        assert_eq!(orientation.stable, TokenIndex::Token0);
        assert_eq!(orientation.advisory, Some(Advisory::NoStablecoinIdentified));
    }

    #[test]
    fn test_both_stable_defaults_to_token0() {
        let orientation = Orientation::resolve(&USDT, &USDC, &bsc_stables());
        assert_eq!(orientation.stable, TokenIndex::Token0);
        assert_eq!(orientation.advisory, Some(Advisory::AmbiguousStablecoin));
    }

    #[test]
    fn test_unit_price_inverts_for_stable_token0() {
        let price = BigDecimal::from_str("0.004").unwrap();
        let orientation = Orientation::resolve(&USDT, &WBNB, &bsc_stables());
        assert_eq!(orientation.unit_price(&price), BigDecimal::from(250));

        let orientation = Orientation::resolve(&WBNB, &USDT, &bsc_stables());
        assert_eq!(orientation.unit_price(&price), price);
    }

    #[test]
    fn test_inversion_round_trip() {
        let price = price_from_sqrt_price(&sqrt_price_from_tick(-57_000), 18, 18);
        let orientation = Orientation::resolve(&USDT, &WBNB, &bsc_stables());
        let once = orientation.unit_price(&price);
        let twice = orientation.unit_price(&once);
        let tolerance = BigDecimal::from_str("1e-45").unwrap();
        assert!(((twice - &price) / &price).abs() < tolerance);
    }

    #[test]
    fn test_price_range_swaps_bounds_when_inverted() {
        let lower = price_from_sqrt_price(&sqrt_price_from_tick(-58_000), 18, 18);
        let upper = price_from_sqrt_price(&sqrt_price_from_tick(-56_000), 18, 18);

        let inverted =
            Orientation::resolve(&USDT, &WBNB, &bsc_stables()).price_range(&lower, &upper);
        assert!(inverted.min_price <= inverted.max_price);
        assert_eq!(inverted.min_price, reciprocal(&upper).unwrap());
        assert_eq!(inverted.max_price, reciprocal(&lower).unwrap());

        let direct = Orientation::resolve(&WBNB, &USDT, &bsc_stables()).price_range(&lower, &upper);
        assert_eq!(direct.min_price, lower);
        assert_eq!(direct.max_price, upper);
    }

    #[test]
    fn test_zero_price_has_no_reciprocal() {
        let orientation = Orientation::resolve(&USDT, &WBNB, &bsc_stables());
        assert_eq!(orientation.unit_price(&BigDecimal::default()), BigDecimal::default());
    }
}
