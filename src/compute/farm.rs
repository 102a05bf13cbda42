use rust_decimal::Decimal;

use super::distribution::refresh_weekly_rewards;
use super::energy::{current_week_entry, optimal_energy};
use super::timekeeping::refresh_week;
use super::{boosted_shares, div, mul, quote, scaled};
use crate::cache_state::Table;
use crate::error::StateResult;
use crate::settings::ComputeSettings;
use crate::types::conversions::format_decimal;
use crate::types::{Farm, Token};

/// Recomputes every derived field of `farm`: week bounds, token prices, TVL,
/// base/boosted APR, booster-rewards distribution and APR, and the optimal
/// energy per LP token when boosted rewards are configured.
pub fn refresh_farm(
    farm: &mut Farm,
    tokens: &Table<Token>,
    settings: &ComputeSettings,
) -> StateResult<()> {
    refresh_week(&mut farm.time, settings);

    let farmed = quote(tokens, &farm.farmed_token_id)?;
    let farming = quote(tokens, &farm.farming_token_id)?;

    let tvl = farming.value_of("farmingTokenReserve", &farm.farming_token_reserve)?;

    let yearly = if farm.produce_rewards_enabled {
        let per_block = scaled("perBlockRewards", &farm.per_block_rewards, farmed.decimals)?;
        let per_year = mul(
            per_block,
            Decimal::from(settings.blocks_per_year()),
            "farm yearly rewards",
        )?;
        mul(per_year, farmed.price_usd, "farm yearly rewards")?
    } else {
        Decimal::ZERO
    };

    let (unboosted, boosted) = boosted_shares(farm.boosted_yields_rewards_percentage)?;
    let base_apr = div(mul(yearly, unboosted, "farm base APR")?, tvl, "farm base APR")?;
    let boosted_apr = div(mul(yearly, boosted, "farm boosted APR")?, tvl, "farm boosted APR")?;

    refresh_weekly_rewards(&mut farm.booster_rewards, tokens, Some(tvl), settings)?;

    farm.optimal_energy_per_lp = if boosted.is_zero() {
        None
    } else {
        let entry = current_week_entry(&farm.address, farm.time.current_week, &farm.booster_rewards)?;
        let energy = optimal_energy(
            &farm.boosted_yields_factors,
            &entry.total_energy_for_week,
            &farm.farm_token_supply,
        )?;
        Some(format_decimal(energy))
    };

    farm.farmed_token_price_usd = format_decimal(farmed.price_usd);
    farm.farming_token_price_usd = format_decimal(farming.price_usd);
    farm.total_value_locked_usd = format_decimal(tvl);
    farm.base_apr = format_decimal(base_apr);
    farm.boosted_apr = format_decimal(boosted_apr);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::test_support::{fixture, token_tables};
    use crate::error::StateError;

    fn farm(address: &str) -> Farm {
        fixture()
            .farms
            .into_iter()
            .find(|f| f.address == address)
            .unwrap()
    }

    #[test]
    fn test_refresh_boosted_farm() {
        let tables = token_tables();
        let mut farm = farm("erd1qqqqqqqqqqqqqpgqfarmegldmex");
        refresh_farm(&mut farm, &tables.tokens, &ComputeSettings::default()).unwrap();

        assert_eq!(farm.total_value_locked_usd, "2000000");
        assert_eq!(farm.farmed_token_price_usd, "0.000004");
        assert_eq!(farm.base_apr, "0.021024");
        assert_eq!(farm.boosted_apr, "0.031536");
        assert_eq!(farm.optimal_energy_per_lp.as_deref(), Some("25000"));
        assert_eq!(farm.time.start_epoch_for_week, 1063);
        assert_eq!(farm.time.end_epoch_for_week, 1069);

        let week = &farm.booster_rewards[0];
        assert_eq!(week.apr.as_deref(), Some("0.208"));
        let shares: Vec<&str> = week
            .rewards_distribution_for_week
            .iter()
            .map(|d| d.percentage.as_str())
            .collect();
        assert_eq!(shares, ["50.0000", "50.0000"]);
    }

    #[test]
    fn test_refresh_unboosted_farm_has_no_optimal_energy() {
        let tables = token_tables();
        let mut farm = farm("erd1qqqqqqqqqqqqqpgqfarmegldusdc");
        refresh_farm(&mut farm, &tables.tokens, &ComputeSettings::default()).unwrap();

        assert_eq!(farm.base_apr, "0.010512");
        assert_eq!(farm.boosted_apr, "0");
        assert!(farm.optimal_energy_per_lp.is_none());
    }

    #[test]
    fn test_disabled_production_zeroes_apr() {
        let tables = token_tables();
        let mut farm = farm("erd1qqqqqqqqqqqqqpgqfarmegldusdc");
        farm.produce_rewards_enabled = false;
        refresh_farm(&mut farm, &tables.tokens, &ComputeSettings::default()).unwrap();
        assert_eq!(farm.base_apr, "0");
    }

    #[test]
    fn test_missing_current_week_booster_entry_propagates() {
        let tables = token_tables();
        let mut farm = farm("erd1qqqqqqqqqqqqqpgqfarmegldmex");
        farm.time.current_week = 11;
        let err = refresh_farm(&mut farm, &tables.tokens, &ComputeSettings::default()).unwrap_err();
        assert!(matches!(err, StateError::MissingBoosterRewards { week: 11, .. }));
    }

    #[test]
    fn test_zero_tvl_is_division_by_zero() {
        let tables = token_tables();
        let mut farm = farm("erd1qqqqqqqqqqqqqpgqfarmegldusdc");
        farm.farming_token_reserve = "0".to_string();
        let err = refresh_farm(&mut farm, &tables.tokens, &ComputeSettings::default()).unwrap_err();
        assert!(matches!(err, StateError::DivisionByZero(_)));
    }
}
