use rust_decimal::Decimal;

use super::timekeeping::refresh_week;
use super::{div, mul, quote, sum};
use crate::cache_state::Table;
use crate::error::StateResult;
use crate::settings::ComputeSettings;
use crate::types::conversions::{format_decimal, format_percentage};
use crate::types::{EsdtTokenPayment, FeesCollector, GlobalInfoByWeek, Token, TokenDistribution};

/// USD value of every payment, in input order.
pub fn payment_values(
    payments: &[EsdtTokenPayment],
    tokens: &Table<Token>,
) -> StateResult<Vec<Decimal>> {
    payments
        .iter()
        .map(|payment| quote(tokens, &payment.token_identifier)?.value_of("amount", &payment.amount))
        .collect()
}

/// Share of each payment in the week's total USD value, four decimal places.
///
/// A zero total yields "0.0000" for every payment.
pub fn compute_distribution(
    payments: &[EsdtTokenPayment],
    tokens: &Table<Token>,
) -> StateResult<Vec<TokenDistribution>> {
    let values = payment_values(payments, tokens)?;
    let total = sum(&values, "reward distribution total")?;
    let hundred = Decimal::ONE_HUNDRED;

    payments
        .iter()
        .zip(values)
        .map(|(payment, value)| {
            let percentage = if total.is_zero() {
                Decimal::ZERO
            } else {
                mul(div(value, total, "reward distribution")?, hundred, "reward distribution")?
            };
            Ok(TokenDistribution {
                token_id: payment.token_identifier.clone(),
                percentage: format_percentage(percentage),
            })
        })
        .collect()
}

/// Refreshes the distribution of every weekly entry and, when `apr_base` is
/// given, the entry's annualized APR (`weekUSD * weeksPerYear / apr_base`).
pub fn refresh_weekly_rewards(
    entries: &mut [GlobalInfoByWeek],
    tokens: &Table<Token>,
    apr_base: Option<Decimal>,
    settings: &ComputeSettings,
) -> StateResult<()> {
    let weeks_per_year = Decimal::from(settings.weeks_per_year);
    for entry in entries.iter_mut() {
        entry.rewards_distribution_for_week =
            compute_distribution(&entry.total_rewards_for_week, tokens)?;
        if let Some(base) = apr_base {
            let values = payment_values(&entry.total_rewards_for_week, tokens)?;
            let week_usd = sum(&values, "weekly rewards APR")?;
            let yearly = mul(week_usd, weeks_per_year, "weekly rewards APR")?;
            let apr = div(yearly, base, "weekly rewards APR")?;
            entry.apr = Some(format_decimal(apr));
        }
    }
    Ok(())
}

/// Recomputes the fees collector's week bounds and the distribution of its
/// undistributed rewards. The collector has no locked value, so no APR.
pub fn refresh_fees_collector(
    collector: &mut FeesCollector,
    tokens: &Table<Token>,
    settings: &ComputeSettings,
) -> StateResult<()> {
    refresh_week(&mut collector.time, settings);
    refresh_weekly_rewards(&mut collector.undistributed_rewards, tokens, None, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache_state::StateTables;
    use crate::compute::test_support;
    use crate::error::StateError;
    use rust_decimal_macros::dec;

    fn payment(token: &str, amount: &str) -> EsdtTokenPayment {
        EsdtTokenPayment {
            token_identifier: token.to_string(),
            token_nonce: 0,
            amount: amount.to_string(),
        }
    }

    fn percentages(distribution: &[TokenDistribution]) -> Vec<&str> {
        distribution.iter().map(|d| d.percentage.as_str()).collect()
    }

    #[test]
    fn test_distribution_of_ten_twenty_thirty_dollars() {
        let tables = test_support::token_tables();
        // USDC: 6 decimals at $1
        let payments = vec![
            payment("USDC-c76f1f", "10000000"),
            payment("USDC-c76f1f", "20000000"),
            payment("USDC-c76f1f", "30000000"),
        ];
        let distribution = compute_distribution(&payments, &tables.tokens).unwrap();
        assert_eq!(percentages(&distribution), ["16.6667", "33.3333", "50.0000"]);

        let sum: Decimal = distribution
            .iter()
            .map(|d| d.percentage.parse::<Decimal>().unwrap())
            .sum();
        assert!((sum - dec!(100)).abs() <= dec!(0.0001));
    }

    #[test]
    fn test_distribution_zero_total_is_zero_not_error() {
        let tables = test_support::token_tables();
        let payments = vec![payment("MEX-455c57", "0"), payment("WEGLD-bd4d79", "0")];
        let distribution = compute_distribution(&payments, &tables.tokens).unwrap();
        assert_eq!(percentages(&distribution), ["0.0000", "0.0000"]);
    }

    #[test]
    fn test_distribution_mixed_tokens() {
        let tables = test_support::token_tables();
        // 1e9 MEX at $0.000004 = $4000, 200 WEGLD at $40 = $8000
        let payments = vec![
            payment("MEX-455c57", "1000000000000000000000000000"),
            payment("WEGLD-bd4d79", "200000000000000000000"),
        ];
        let distribution = compute_distribution(&payments, &tables.tokens).unwrap();
        assert_eq!(percentages(&distribution), ["33.3333", "66.6667"]);
    }

    #[test]
    fn test_distribution_unknown_token_propagates() {
        let tables = StateTables::new();
        let payments = vec![payment("MEX-455c57", "1")];
        assert!(compute_distribution(&payments, &tables.tokens).is_err());
    }

    #[test]
    fn test_distribution_total_overflow_is_an_error() {
        let tables = test_support::token_tables();
        // each payment is worth $9e27, their sum exceeds Decimal::MAX
        let payments: Vec<_> = (0..9)
            .map(|_| payment("USDC-c76f1f", "9000000000000000000000000000000000"))
            .collect();
        let err = compute_distribution(&payments, &tables.tokens).unwrap_err();
        assert!(matches!(err, StateError::Overflow(_)));
    }

    #[test]
    fn test_distribution_rounds_midpoint_up() {
        let tables = test_support::token_tables();
        // shares of 0.00005% and 99.99995%
        let payments = vec![
            payment("USDC-c76f1f", "1"),
            payment("USDC-c76f1f", "1999999"),
        ];
        let distribution = compute_distribution(&payments, &tables.tokens).unwrap();
        assert_eq!(percentages(&distribution), ["0.0001", "100.0000"]);
    }

    #[test]
    fn test_weekly_apr_from_rewards() {
        let tables = test_support::token_tables();
        let mut entries = vec![GlobalInfoByWeek {
            week: 10,
            total_rewards_for_week: vec![payment("USDC-c76f1f", "1000000000")],
            total_energy_for_week: "0".to_string(),
            total_locked_tokens_for_week: "0".to_string(),
            rewards_distribution_for_week: Vec::new(),
            apr: None,
        }];
        refresh_weekly_rewards(
            &mut entries,
            &tables.tokens,
            Some(dec!(52000)),
            &ComputeSettings::default(),
        )
        .unwrap();
        // $1000 a week, 52 weeks, over $52000
        assert_eq!(entries[0].apr.as_deref(), Some("1"));
        assert_eq!(percentages(&entries[0].rewards_distribution_for_week), ["100.0000"]);
    }

    #[test]
    fn test_refresh_fees_collector() {
        let tables = test_support::token_tables();
        let mut collector = test_support::fixture().fees_collector.unwrap();
        refresh_fees_collector(&mut collector, &tables.tokens, &ComputeSettings::default()).unwrap();
        assert_eq!(collector.time.start_epoch_for_week, 1063);
        let week = &collector.undistributed_rewards[0];
        assert_eq!(percentages(&week.rewards_distribution_for_week), ["33.3333", "66.6667"]);
        assert_eq!(week.apr, None);
    }
}
