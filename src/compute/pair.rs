//! Pair locked values and the pair <-> farm <-> staking proxy back-links.

use super::{decimal, mul, quote, scaled};
use crate::cache_state::Table;
use crate::error::{StateError, StateResult};
use crate::types::conversions::format_decimal;
use crate::types::{Farm, Pair, StakingFarm, StakingProxy, Token};

/// Recomputes locked values from reserves and USD prices, and mirrors the
/// fee APR into `compoundedAPR`.
pub fn refresh_pair(pair: &mut Pair, tokens: &Table<Token>) -> StateResult<()> {
    let first = quote(tokens, &pair.first_token_id)?;
    let second = quote(tokens, &pair.second_token_id)?;

    let first_locked = mul(
        scaled("info.reserves0", &pair.info.reserves0, first.decimals)?,
        decimal("firstTokenPriceUSD", &pair.first_token_price_usd)?,
        "first token locked value",
    )?;
    let second_locked = mul(
        scaled("info.reserves1", &pair.info.reserves1, second.decimals)?,
        decimal("secondTokenPriceUSD", &pair.second_token_price_usd)?,
        "second token locked value",
    )?;
    let locked = first_locked
        .checked_add(second_locked)
        .ok_or(StateError::Overflow("locked value"))?;

    pair.first_token_locked_value_usd = format_decimal(first_locked);
    pair.second_token_locked_value_usd = format_decimal(second_locked);
    pair.locked_value_usd = format_decimal(locked);
    pair.compounded_apr.fees_apr = pair.fees_apr.clone();
    Ok(())
}

/// Points `pair` at `farm` and copies the farm's APR contribution.
pub fn link_farm(pair: &mut Pair, farm: &Farm) {
    pair.has_farms = true;
    pair.farm_address = Some(farm.address.clone());
    pair.compounded_apr.farm_base_apr = farm.base_apr.clone();
    pair.compounded_apr.farm_boosted_apr = farm.boosted_apr.clone();
}

/// Cross-links a staking proxy with its pair and staking farm.
pub fn link_staking_proxy(
    pair: &mut Pair,
    proxy: &mut StakingProxy,
    staking_farm: &mut StakingFarm,
) {
    pair.has_dual_farms = true;
    pair.staking_farm_address = Some(staking_farm.address.clone());
    pair.staking_proxy_address = Some(proxy.address.clone());
    pair.compounded_apr.dual_farm_base_apr = staking_farm.apr.clone();
    pair.compounded_apr.dual_farm_boosted_apr = staking_farm.boosted_apr.clone();

    staking_farm.staking_proxy_address = Some(proxy.address.clone());
    proxy.staking_min_unbond_epochs = staking_farm.min_unbond_epochs;
}
