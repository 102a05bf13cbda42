use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::patch::{self, Patch, PatchField, UpdateOutcome};
use super::query::{
    at_least, contains_ignore_case, exact, in_set, project, project_all, require, run_query,
    sort_decimal, threshold, Pagination, Projection, SortField, SortOrder,
};
use crate::cache_state::StateTables;
use crate::compute::farm::refresh_farm;
use crate::compute::pair::link_farm;
use crate::error::StateResult;
use crate::settings::ComputeSettings;
use crate::types::{EntityKind, Farm, FarmPatch};

impl Patch for FarmPatch {
    fn key(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

static FARM_PATCH_FIELDS: &[PatchField<Farm, FarmPatch>] = patch_fields!(Farm, FarmPatch;
    "address" => address immutable,
    "farmedTokenId" => farmed_token_id immutable,
    "farmTokenId" => farm_token_id immutable,
    "farmingTokenId" => farming_token_id immutable,
    "pairAddress" => pair_address immutable,
    "perBlockRewards" => per_block_rewards set,
    "farmTokenSupply" => farm_token_supply set,
    "farmingTokenReserve" => farming_token_reserve set,
    "rewardPerShare" => reward_per_share set,
    "rewardReserve" => reward_reserve set,
    "lastRewardBlockNonce" => last_reward_block_nonce set,
    "divisionSafetyConstant" => division_safety_constant set,
    "produceRewardsEnabled" => produce_rewards_enabled set,
    "minimumFarmingEpochs" => minimum_farming_epochs set,
    "penaltyPercent" => penalty_percent set,
    "state" => state set,
    "boostedYieldsRewardsPercentage" => boosted_yields_rewards_percentage set,
    "boostedYieldsFactors" => boosted_yields_factors set,
    "undistributedBoostedRewards" => undistributed_boosted_rewards set,
    "energyFactoryAddress" => energy_factory_address set,
    "rewardType" => reward_type set,
    "version" => version set,
    "deployedAt" => deployed_at set,
    "time" => time set,
    "boosterRewards" => booster_rewards set,
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmsFilter {
    pub addresses: Option<Vec<String>>,
    pub pair_address: Option<String>,
    pub farming_token_id: Option<String>,
    pub min_tvl: Option<String>,
    pub search_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FarmSortField {
    Tvl,
    BaseApr,
    BoostedApr,
    DeployedAt,
}

impl SortField<Farm> for FarmSortField {
    fn sort_value(&self, farm: &Farm) -> StateResult<Decimal> {
        match self {
            FarmSortField::Tvl => sort_decimal("totalValueLockedUSD", &farm.total_value_locked_usd),
            FarmSortField::BaseApr => sort_decimal("baseApr", &farm.base_apr),
            FarmSortField::BoostedApr => sort_decimal("boostedApr", &farm.boosted_apr),
            FarmSortField::DeployedAt => sort_decimal("deployedAt", &farm.deployed_at),
        }
    }
}

pub fn get_farms(
    tables: &StateTables,
    addresses: &[String],
    mask: &[String],
) -> StateResult<Vec<Projection>> {
    addresses
        .iter()
        .map(|address| {
            let farm = require(tables.farms.get(address), EntityKind::Farm, address)?;
            project(farm, mask)
        })
        .collect()
}

pub fn get_all_farms(tables: &StateTables, mask: &[String]) -> StateResult<Vec<Projection>> {
    project_all(tables.farms.values(), mask)
}

pub fn filter_farms(
    tables: &StateTables,
    filter: &FarmsFilter,
    sort: Option<(FarmSortField, SortOrder)>,
    pagination: Pagination,
    mask: &[String],
) -> StateResult<(Vec<Projection>, usize)> {
    let min_tvl = threshold("minTvl", filter.min_tvl.as_deref())?;
    let page = run_query(
        tables.farms.values(),
        |farm| {
            let accepted = in_set(filter.addresses.as_deref(), &farm.address)
                && (filter.pair_address.is_none()
                    || filter.pair_address.as_deref() == farm.pair_address.as_deref())
                && exact(filter.farming_token_id.as_deref(), farm.farming_token_id.as_str())
                && filter.search_token.as_deref().map_or(true, |search| {
                    contains_ignore_case(
                        [
                            farm.farmed_token_id.as_str(),
                            farm.farming_token_id.as_str(),
                            farm.farm_token_id.as_str(),
                        ],
                        search,
                    )
                });
            Ok(accepted && at_least("totalValueLockedUSD", &farm.total_value_locked_usd, min_tvl)?)
        },
        sort,
        pagination,
    )?;
    Ok((project_all(page.items, mask)?, page.count))
}

/// Applies masked farm patches, recomputes each farm and re-syncs the APR
/// mirrored into its pair.
pub fn update_farms(
    tables: &mut StateTables,
    patches: &[FarmPatch],
    mask: &[String],
    settings: &ComputeSettings,
) -> StateResult<UpdateOutcome> {
    let staged = patch::stage(&tables.farms, FARM_PATCH_FIELDS, patches, mask);

    let mut refreshed = Vec::with_capacity(staged.records.len());
    for (_, mut farm) in staged.records {
        refresh_farm(&mut farm, &tables.tokens, settings)?;
        refreshed.push(farm);
    }

    let updated_count = refreshed.len();
    for farm in refreshed {
        store_farm(tables, farm);
    }
    debug!(
        updated = updated_count,
        failed = staged.failed_keys.len(),
        "farms updated"
    );
    Ok(UpdateOutcome {
        updated_count,
        failed_keys: staged.failed_keys,
    })
}

/// Writes a computed farm and mirrors its APR into the linked pair.
pub(crate) fn store_farm(tables: &mut StateTables, farm: Farm) {
    if let Some(pair_address) = farm.pair_address.as_deref() {
        if let Some(pair) = tables.pairs.get_mut(pair_address) {
            link_farm(pair, &farm);
        }
    }
    tables.farms.set(farm);
}
