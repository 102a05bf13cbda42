use rust_decimal::Decimal;

use super::distribution::refresh_weekly_rewards;
use super::energy::{current_week_entry, optimal_energy};
use super::timekeeping::refresh_week;
use super::{boosted_shares, decimal, div, mul, quote, scaled, sub, MAX_PERCENT};
use crate::cache_state::Table;
use crate::error::StateResult;
use crate::settings::ComputeSettings;
use crate::types::conversions::format_decimal;
use crate::types::{StakingFarm, Token};

/// Recomputes every derived field of a staking farm.
///
/// Yearly rewards are capped at `staked * annualPercentageRewards`; the
/// uncapped variants ignore that ceiling. Remaining days estimate when the
/// reward capacity runs out at the current rate and are zero when the farm
/// is not producing.
pub fn refresh_staking_farm(
    farm: &mut StakingFarm,
    tokens: &Table<Token>,
    settings: &ComputeSettings,
) -> StateResult<()> {
    refresh_week(&mut farm.time, settings);

    let farming = quote(tokens, &farm.farming_token_id)?;
    let reward = quote(tokens, &farm.reward_token_id)?;

    let staked_tokens = scaled("farmTokenSupply", &farm.farm_token_supply, farm.farm_token_decimals)?;
    let staked_usd = mul(staked_tokens, farming.price_usd, "staked value")?;

    let per_block = scaled("perBlockRewards", &farm.per_block_rewards, reward.decimals)?;
    let uncapped_yearly = mul(
        per_block,
        Decimal::from(settings.blocks_per_year()),
        "staking yearly rewards",
    )?;
    let apr_cap = div(
        mul(
            staked_tokens,
            Decimal::from(farm.annual_percentage_rewards),
            "staking yearly rewards",
        )?,
        Decimal::from(MAX_PERCENT),
        "staking yearly rewards",
    )?;
    let capped_yearly = uncapped_yearly.min(apr_cap);

    let (unboosted, boosted) = boosted_shares(farm.boosted_yields_rewards_percentage)?;
    let yearly_apr = |yearly: Decimal, share: Decimal| -> StateResult<Decimal> {
        let usd = mul(yearly, reward.price_usd, "staking APR")?;
        div(mul(usd, share, "staking APR")?, staked_usd, "staking APR")
    };
    let apr = yearly_apr(capped_yearly, unboosted)?;
    let apr_uncapped = yearly_apr(uncapped_yearly, unboosted)?;
    let boosted_apr = yearly_apr(capped_yearly, boosted)?;
    let max_rewards_factor = decimal(
        "maxRewardsFactor",
        &farm.boosted_yields_factors.max_rewards_factor,
    )?;
    let max_boosted_apr = mul(boosted_apr, max_rewards_factor, "staking max boosted APR")?;

    let capacity = scaled("rewardCapacity", &farm.reward_capacity, reward.decimals)?;
    let accumulated = scaled("accumulatedRewards", &farm.accumulated_rewards, reward.decimals)?;
    let is_producing = farm.produce_rewards_enabled && accumulated < capacity;

    let (remaining_days, remaining_days_uncapped) = if is_producing {
        let remaining = mul(
            sub(capacity, accumulated, "rewards remaining days")?,
            Decimal::from(settings.days_per_year),
            "rewards remaining days",
        )?;
        (
            remaining_days(remaining, capped_yearly)?,
            remaining_days(remaining, uncapped_yearly)?,
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    refresh_weekly_rewards(&mut farm.booster_rewards, tokens, Some(staked_usd), settings)?;

    farm.optimal_energy_per_staking = if boosted.is_zero() {
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

    farm.farming_token_price_usd = format_decimal(farming.price_usd);
    farm.reward_token_price_usd = format_decimal(reward.price_usd);
    farm.staked_value_usd = format_decimal(staked_usd);
    farm.apr = format_decimal(apr);
    farm.apr_uncapped = format_decimal(apr_uncapped);
    farm.boosted_apr = format_decimal(boosted_apr);
    farm.max_boosted_apr = format_decimal(max_boosted_apr);
    farm.is_producing_rewards = is_producing;
    farm.rewards_remaining_days = format_decimal(remaining_days);
    farm.rewards_remaining_days_uncapped = format_decimal(remaining_days_uncapped);
    Ok(())
}

// A producing farm with no emission never depletes; reported as zero days.
fn remaining_days(remaining_times_days: Decimal, yearly: Decimal) -> StateResult<Decimal> {
    if yearly.is_zero() {
        return Ok(Decimal::ZERO);
    }
    div(remaining_times_days, yearly, "rewards remaining days")
}
