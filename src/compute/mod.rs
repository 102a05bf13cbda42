//! Reward/APR compute services.
//!
//! Pure transformations over already materialized records. Each `refresh_*`
//! function overwrites the derived fields of one record from its inputs and
//! the token table; nothing here writes to the tables directly.

pub mod distribution;
pub mod energy;
pub mod farm;
pub mod pair;
pub mod staking;
pub mod timekeeping;

use rust_decimal::Decimal;

use crate::cache_state::Table;
use crate::error::{StateError, StateResult};
use crate::types::conversions::{parse_decimal, parse_scaled};
use crate::types::{EntityKind, Token};

/// Basis-point denominator for boosted shares and annual percentage caps.
pub const MAX_PERCENT: u64 = 10_000;

/// Decimals used by energy amounts and farm token supplies.
pub const ENERGY_DECIMALS: u32 = 18;

/// USD price and decimals of a token, as needed to value raw amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenQuote {
    pub price_usd: Decimal,
    pub decimals: u32,
}

impl TokenQuote {
    /// USD value of a raw on-chain amount of this token.
    pub fn value_of(&self, field: &'static str, raw: &str) -> StateResult<Decimal> {
        mul(scaled(field, raw, self.decimals)?, self.price_usd, field)
    }
}

pub fn quote(tokens: &Table<Token>, identifier: &str) -> StateResult<TokenQuote> {
    let token = tokens
        .get(identifier)
        .ok_or_else(|| StateError::not_found(EntityKind::Token, identifier))?;
    Ok(TokenQuote {
        price_usd: decimal("price", &token.price)?,
        decimals: token.decimals,
    })
}

pub(crate) fn decimal(field: &'static str, value: &str) -> StateResult<Decimal> {
    parse_decimal(value).map_err(|e| StateError::decimal(field, value, e))
}

pub(crate) fn scaled(field: &'static str, raw: &str, decimals: u32) -> StateResult<Decimal> {
    parse_scaled(raw, decimals).map_err(|e| StateError::decimal(field, raw, e))
}

pub(crate) fn add(a: Decimal, b: Decimal, context: &'static str) -> StateResult<Decimal> {
    a.checked_add(b).ok_or(StateError::Overflow(context))
}

pub(crate) fn sub(a: Decimal, b: Decimal, context: &'static str) -> StateResult<Decimal> {
    a.checked_sub(b).ok_or(StateError::Overflow(context))
}

pub(crate) fn sum(values: &[Decimal], context: &'static str) -> StateResult<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |total, value| add(total, *value, context))
}

pub(crate) fn mul(a: Decimal, b: Decimal, context: &'static str) -> StateResult<Decimal> {
    a.checked_mul(b).ok_or(StateError::Overflow(context))
}

pub(crate) fn div(numerator: Decimal, denominator: Decimal, context: &'static str) -> StateResult<Decimal> {
    if denominator.is_zero() {
        return Err(StateError::DivisionByZero(context));
    }
    numerator
        .checked_div(denominator)
        .ok_or(StateError::Overflow(context))
}

/// Splits a boosted percentage (basis points) into `(unboosted, boosted)` shares.
pub(crate) fn boosted_shares(percentage: u64) -> StateResult<(Decimal, Decimal)> {
    if percentage > MAX_PERCENT {
        return Err(StateError::InvalidDecimal {
            field: "boostedYieldsRewardsPercentage",
            value: percentage.to_string(),
        });
    }
    let max = Decimal::from(MAX_PERCENT);
    let boosted = Decimal::from(percentage) / max;
    Ok((Decimal::ONE - boosted, boosted))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::cache_state::StateTables;
    use crate::types::FullSnapshot;

    pub fn fixture() -> FullSnapshot {
        serde_json::from_str(include_str!("../../tests/fixtures/snapshot.json")).unwrap()
    }

    /// Tables holding only the fixture tokens.
    pub fn token_tables() -> StateTables {
        let mut tables = StateTables::new();
        for token in fixture().tokens {
            tables.tokens.set(token);
        }
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_values_raw_amounts() {
        let tables = test_support::token_tables();
        let usdc = quote(&tables.tokens, "USDC-c76f1f").unwrap();
        assert_eq!(usdc.decimals, 6);
        assert_eq!(usdc.value_of("amount", "2500000").unwrap(), dec!(2.5));
    }

    #[test]
    fn test_quote_missing_token_is_not_found() {
        let tables = test_support::token_tables();
        let err = quote(&tables.tokens, "NOPE-000000").unwrap_err();
        assert!(matches!(err, StateError::NotFound { kind: EntityKind::Token, .. }));
    }

    #[test]
    fn test_div_guards_zero_denominator() {
        assert!(matches!(
            div(dec!(1), Decimal::ZERO, "tvl"),
            Err(StateError::DivisionByZero("tvl"))
        ));
        assert_eq!(div(dec!(1), dec!(4), "x").unwrap(), dec!(0.25));
    }

    #[test]
    fn test_boosted_shares() {
        assert_eq!(boosted_shares(6000).unwrap(), (dec!(0.4), dec!(0.6)));
        assert_eq!(boosted_shares(0).unwrap(), (Decimal::ONE, Decimal::ZERO));
        assert!(boosted_shares(10_001).is_err());
    }
}
