use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::patch::{self, Patch, PatchField, UpdateOutcome};
use super::query::{
    at_least, contains_ignore_case, exact, in_set, project, project_all, require, run_query,
    sort_decimal, threshold, Pagination, Projection, SortField, SortOrder,
};
use crate::cache_state::StateTables;
use crate::compute::pair::link_staking_proxy;
use crate::compute::staking::refresh_staking_farm;
use crate::error::StateResult;
use crate::settings::ComputeSettings;
use crate::types::{EntityKind, StakingFarm, StakingFarmPatch};

impl Patch for StakingFarmPatch {
    fn key(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

static STAKING_FARM_PATCH_FIELDS: &[PatchField<StakingFarm, StakingFarmPatch>] = patch_fields!(StakingFarm, StakingFarmPatch;
    "address" => address immutable,
    "farmTokenId" => farm_token_id immutable,
    "farmingTokenId" => farming_token_id immutable,
    "rewardTokenId" => reward_token_id immutable,
    "farmTokenDecimals" => farm_token_decimals immutable,
    "farmTokenSupply" => farm_token_supply set,
    "perBlockRewards" => per_block_rewards set,
    "accumulatedRewards" => accumulated_rewards set,
    "rewardCapacity" => reward_capacity set,
    "annualPercentageRewards" => annual_percentage_rewards set,
    "minUnbondEpochs" => min_unbond_epochs set,
    "produceRewardsEnabled" => produce_rewards_enabled set,
    "state" => state set,
    "boostedYieldsRewardsPercentage" => boosted_yields_rewards_percentage set,
    "boostedYieldsFactors" => boosted_yields_factors set,
    "deployedAt" => deployed_at set,
    "time" => time set,
    "boosterRewards" => booster_rewards set,
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingFarmsFilter {
    pub addresses: Option<Vec<String>>,
    pub is_producing_rewards: Option<bool>,
    #[serde(rename = "minStakedValueUSD")]
    pub min_staked_value_usd: Option<String>,
    pub search_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StakingFarmSortField {
    Tvl,
    Apr,
    DeployedAt,
    RewardsRemainingDays,
}

impl SortField<StakingFarm> for StakingFarmSortField {
    fn sort_value(&self, farm: &StakingFarm) -> StateResult<Decimal> {
        match self {
            StakingFarmSortField::Tvl => sort_decimal("stakedValueUSD", &farm.staked_value_usd),
            StakingFarmSortField::Apr => sort_decimal("apr", &farm.apr),
            StakingFarmSortField::DeployedAt => sort_decimal("deployedAt", &farm.deployed_at),
            StakingFarmSortField::RewardsRemainingDays => {
                sort_decimal("rewardsRemainingDays", &farm.rewards_remaining_days)
            }
        }
    }
}

pub fn get_staking_farms(
    tables: &StateTables,
    addresses: &[String],
    mask: &[String],
) -> StateResult<Vec<Projection>> {
    addresses
        .iter()
        .map(|address| {
            let farm = require(tables.staking_farms.get(address), EntityKind::StakingFarm, address)?;
            project(farm, mask)
        })
        .collect()
}

pub fn get_all_staking_farms(tables: &StateTables, mask: &[String]) -> StateResult<Vec<Projection>> {
    project_all(tables.staking_farms.values(), mask)
}

pub fn filter_staking_farms(
    tables: &StateTables,
    filter: &StakingFarmsFilter,
    sort: Option<(StakingFarmSortField, SortOrder)>,
    pagination: Pagination,
    mask: &[String],
) -> StateResult<(Vec<Projection>, usize)> {
    let min_staked = threshold("minStakedValueUSD", filter.min_staked_value_usd.as_deref())?;
    let page = run_query(
        tables.staking_farms.values(),
        |farm| {
            let accepted = in_set(filter.addresses.as_deref(), &farm.address)
                && exact(filter.is_producing_rewards, farm.is_producing_rewards)
                && filter
                    .search_token
                    .as_deref()
                    .map_or(true, |search| search_matches(tables, farm, search));
            Ok(accepted && at_least("stakedValueUSD", &farm.staked_value_usd, min_staked)?)
        },
        sort,
        pagination,
    )?;
    Ok((project_all(page.items, mask)?, page.count))
}

fn search_matches(tables: &StateTables, farm: &StakingFarm, search: &str) -> bool {
    let mut fields = vec![farm.farming_token_id.as_str(), farm.farm_token_id.as_str()];
    if let Some(token) = tables.tokens.get(&farm.farming_token_id) {
        fields.push(&token.name);
        fields.push(&token.ticker);
    }
    contains_ignore_case(fields, search)
}

/// Applies masked staking farm patches, recomputes each farm and re-syncs
/// its staking proxy and the proxy's pair.
pub fn update_staking_farms(
    tables: &mut StateTables,
    patches: &[StakingFarmPatch],
    mask: &[String],
    settings: &ComputeSettings,
) -> StateResult<UpdateOutcome> {
    let staged = patch::stage(&tables.staking_farms, STAKING_FARM_PATCH_FIELDS, patches, mask);

    let mut refreshed = Vec::with_capacity(staged.records.len());
    for (_, mut farm) in staged.records {
        refresh_staking_farm(&mut farm, &tables.tokens, settings)?;
        refreshed.push(farm);
    }

    let updated_count = refreshed.len();
    for farm in refreshed {
        store_staking_farm(tables, farm);
    }
    debug!(
        updated = updated_count,
        failed = staged.failed_keys.len(),
        "staking farms updated"
    );
    Ok(UpdateOutcome {
        updated_count,
        failed_keys: staged.failed_keys,
    })
}

/// Writes a computed staking farm and refreshes the dual-farm links of its
/// proxy and pair.
pub(crate) fn store_staking_farm(tables: &mut StateTables, mut farm: StakingFarm) {
    if let Some(proxy_address) = farm.staking_proxy_address.clone() {
        if let Some(proxy) = tables.staking_proxies.get_mut(&proxy_address) {
            if let Some(pair) = tables.pairs.get_mut(&proxy.pair_address) {
                link_staking_proxy(pair, proxy, &mut farm);
            }
        }
    }
    tables.staking_farms.set(farm);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{loaded_tables, mask, P3, PROXY, STAKING_FARM};

    #[test]
    fn test_initial_state_is_computed_and_linked() {
        let tables = loaded_tables();
        let farm = tables.staking_farms.get(STAKING_FARM).unwrap();
        assert_eq!(farm.apr, "0.2");
        assert_eq!(farm.staking_proxy_address.as_deref(), Some(PROXY));
        let pair = tables.pairs.get(P3).unwrap();
        assert!(pair.has_dual_farms);
        assert_eq!(pair.compounded_apr.dual_farm_base_apr, "0.2");
    }

    #[test]
    fn test_filter_producing_and_search() {
        let tables = loaded_tables();
        let (items, count) = filter_staking_farms(
            &tables,
            &StakingFarmsFilter {
                is_producing_rewards: Some(true),
                search_token: Some("utrust".to_string()),
                min_staked_value_usd: Some("1000000".to_string()),
                ..Default::default()
            },
            Some((StakingFarmSortField::RewardsRemainingDays, SortOrder::Desc)),
            Pagination::default(),
            &mask(&["address", "rewardsRemainingDays"]),
        )
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(items[0]["rewardsRemainingDays"], "525.6");

        let (_, count) = filter_staking_farms(
            &tables,
            &StakingFarmsFilter {
                is_producing_rewards: Some(false),
                ..Default::default()
            },
            None,
            Pagination::default(),
            &[],
        )
        .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_update_apr_ceiling_resyncs_pair_and_proxy() {
        let mut tables = loaded_tables();
        update_staking_farms(
            &mut tables,
            &[StakingFarmPatch {
                address: Some(STAKING_FARM.to_string()),
                annual_percentage_rewards: Some(1250),
                min_unbond_epochs: Some(14),
                ..Default::default()
            }],
            &mask(&["annualPercentageRewards", "minUnbondEpochs"]),
            &ComputeSettings::default(),
        )
        .unwrap();

        let farm = tables.staking_farms.get(STAKING_FARM).unwrap();
        assert_eq!(farm.apr, "0.1");
        assert_eq!(
            tables.pairs.get(P3).unwrap().compounded_apr.dual_farm_base_apr,
            "0.1"
        );
        assert_eq!(
            tables.staking_proxies.get(PROXY).unwrap().staking_min_unbond_epochs,
            14
        );
    }
}
