use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::patch::{self, Patch, PatchField, UpdateOutcome};
use super::query::{
    in_set, project, project_all, require, run_query, sort_integer, Pagination, Projection,
    SortField, SortOrder,
};
use crate::cache_state::StateTables;
use crate::compute::pair::link_staking_proxy;
use crate::error::StateResult;
use crate::types::{EntityKind, StakingProxy, StakingProxyPatch};

impl Patch for StakingProxyPatch {
    fn key(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

static STAKING_PROXY_PATCH_FIELDS: &[PatchField<StakingProxy, StakingProxyPatch>] = patch_fields!(StakingProxy, StakingProxyPatch;
    "address" => address immutable,
    "stakingFarmAddress" => staking_farm_address immutable,
    "pairAddress" => pair_address immutable,
    "stakingTokenId" => staking_token_id immutable,
    "farmTokenId" => farm_token_id immutable,
    "dualYieldTokenId" => dual_yield_token_id immutable,
    "lpFarmAddress" => lp_farm_address set,
    "lpFarmTokenId" => lp_farm_token_id set,
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingProxiesFilter {
    pub addresses: Option<Vec<String>>,
    pub pair_address: Option<String>,
    pub staking_farm_address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StakingProxySortField {
    MinUnbondEpochs,
}

impl SortField<StakingProxy> for StakingProxySortField {
    fn sort_value(&self, proxy: &StakingProxy) -> StateResult<Decimal> {
        match self {
            StakingProxySortField::MinUnbondEpochs => sort_integer(proxy.staking_min_unbond_epochs),
        }
    }
}

pub fn get_staking_proxies(
    tables: &StateTables,
    addresses: &[String],
    mask: &[String],
) -> StateResult<Vec<Projection>> {
    addresses
        .iter()
        .map(|address| {
            let proxy = require(
                tables.staking_proxies.get(address),
                EntityKind::StakingProxy,
                address,
            )?;
            project(proxy, mask)
        })
        .collect()
}

pub fn get_all_staking_proxies(tables: &StateTables, mask: &[String]) -> StateResult<Vec<Projection>> {
    project_all(tables.staking_proxies.values(), mask)
}

pub fn filter_staking_proxies(
    tables: &StateTables,
    filter: &StakingProxiesFilter,
    sort: Option<(StakingProxySortField, SortOrder)>,
    pagination: Pagination,
    mask: &[String],
) -> StateResult<(Vec<Projection>, usize)> {
    let page = run_query(
        tables.staking_proxies.values(),
        |proxy| {
            Ok(in_set(filter.addresses.as_deref(), &proxy.address)
                && filter
                    .pair_address
                    .as_deref()
                    .map_or(true, |pair| pair == proxy.pair_address)
                && filter
                    .staking_farm_address
                    .as_deref()
                    .map_or(true, |farm| farm == proxy.staking_farm_address))
        },
        sort,
        pagination,
    )?;
    Ok((project_all(page.items, mask)?, page.count))
}

/// Applies masked staking proxy patches. Only the LP farm references are
/// patchable; the pair and staking farm links are re-synced on write.
pub fn update_staking_proxies(
    tables: &mut StateTables,
    patches: &[StakingProxyPatch],
    mask: &[String],
) -> StateResult<UpdateOutcome> {
    let staged = patch::stage(&tables.staking_proxies, STAKING_PROXY_PATCH_FIELDS, patches, mask);
    let updated_count = staged.records.len();
    for (_, proxy) in staged.records {
        store_staking_proxy(tables, proxy);
    }
    debug!(
        updated = updated_count,
        failed = staged.failed_keys.len(),
        "staking proxies updated"
    );
    Ok(UpdateOutcome {
        updated_count,
        failed_keys: staged.failed_keys,
    })
}

/// Writes a staking proxy and cross-links it with its pair and staking farm
/// when both are present.
pub(crate) fn store_staking_proxy(tables: &mut StateTables, mut proxy: StakingProxy) {
    let pair = tables.pairs.get_mut(&proxy.pair_address);
    let staking_farm = tables.staking_farms.get_mut(&proxy.staking_farm_address);
    if let (Some(pair), Some(staking_farm)) = (pair, staking_farm) {
        link_staking_proxy(pair, &mut proxy, staking_farm);
    }
    tables.staking_proxies.set(proxy);
}
