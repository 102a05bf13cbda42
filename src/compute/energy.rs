use rust_decimal::Decimal;

use super::{add, decimal, div, mul, scaled, sub, ENERGY_DECIMALS};
use crate::error::{StateError, StateResult};
use crate::types::{BoostedYieldsFactors, GlobalInfoByWeek};

/// Booster entry of `week`, required whenever boosted rewards are configured.
pub fn current_week_entry<'a>(
    address: &str,
    week: u32,
    entries: &'a [GlobalInfoByWeek],
) -> StateResult<&'a GlobalInfoByWeek> {
    entries
        .iter()
        .find(|entry| entry.week == week)
        .ok_or_else(|| StateError::MissingBoosterRewards {
            address: address.to_string(),
            week,
        })
}

/// Energy per farm token at which a position earns the maximum boost:
/// `((u * (A + B) - A) / B) * totalEnergy / farmTokenSupply`.
pub fn optimal_energy(
    factors: &BoostedYieldsFactors,
    total_energy_for_week: &str,
    farm_token_supply: &str,
) -> StateResult<Decimal> {
    let u = decimal("maxRewardsFactor", &factors.max_rewards_factor)?;
    let a = decimal("userRewardsFarm", &factors.user_rewards_farm)?;
    let b = decimal("userRewardsEnergy", &factors.user_rewards_energy)?;

    let weights = add(a, b, "optimal energy")?;
    let weighted = sub(mul(u, weights, "optimal energy")?, a, "optimal energy")?;
    let ratio = div(weighted, b, "optimal energy")?;

    let energy = scaled("totalEnergyForWeek", total_energy_for_week, ENERGY_DECIMALS)?;
    let supply = scaled("farmTokenSupply", farm_token_supply, ENERGY_DECIMALS)?;
    let per_token = div(energy, supply, "optimal energy")?;
    mul(ratio, per_token, "optimal energy")
}
