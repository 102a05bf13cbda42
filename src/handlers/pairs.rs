use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::patch::{self, MergeInto, Patch, PatchField, UpdateOutcome};
use super::query::{
    at_least, contains_ignore_case, exact, in_set, project, project_all, require, run_query,
    sort_decimal, sort_integer, threshold, Pagination, Projection, QueryPage, SortField,
    SortOrder,
};
use crate::cache_state::StateTables;
use crate::compute::pair::refresh_pair;
use crate::error::{StateError, StateResult};
use crate::types::{
    CompoundedApr, EntityKind, Pair, PairInfo, PairInfoPatch, PairPatch, PairState, Token,
};

impl Patch for PairPatch {
    fn key(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

impl MergeInto<PairInfo> for PairInfoPatch {
    fn merge_into(&self, target: &mut PairInfo) {
        if let Some(reserves0) = &self.reserves0 {
            target.reserves0 = reserves0.clone();
        }
        if let Some(reserves1) = &self.reserves1 {
            target.reserves1 = reserves1.clone();
        }
        if let Some(total_supply) = &self.total_supply {
            target.total_supply = total_supply.clone();
        }
    }
}

static PAIR_PATCH_FIELDS: &[PatchField<Pair, PairPatch>] = patch_fields!(Pair, PairPatch;
    "address" => address immutable,
    "firstTokenId" => first_token_id immutable,
    "secondTokenId" => second_token_id immutable,
    "liquidityPoolTokenId" => liquidity_pool_token_id immutable,
    "info" => info merge,
    "firstTokenPrice" => first_token_price set,
    "firstTokenPriceUSD" => first_token_price_usd set,
    "secondTokenPrice" => second_token_price set,
    "secondTokenPriceUSD" => second_token_price_usd set,
    "liquidityPoolTokenPriceUSD" => liquidity_pool_token_price_usd set,
    "previous24hLockedValueUSD" => previous24h_locked_value_usd set,
    "firstTokenVolume24h" => first_token_volume24h set,
    "secondTokenVolume24h" => second_token_volume24h set,
    "volumeUSD24h" => volume_usd24h set,
    "previous24hVolumeUSD" => previous24h_volume_usd set,
    "feesUSD24h" => fees_usd24h set,
    "previous24hFeesUSD" => previous24h_fees_usd set,
    "feesAPR" => fees_apr set,
    "totalFeePercent" => total_fee_percent set,
    "specialFeePercent" => special_fee_percent set,
    "feeState" => fee_state set,
    "state" => state set,
    "tradesCount" => trades_count set,
    "tradesCount24h" => trades_count24h set,
    "deployedAt" => deployed_at set,
    "initialLiquidityAdder" => initial_liquidity_adder set,
    "trustedSwapPairs" => trusted_swap_pairs set,
    "feesCollectorAddress" => fees_collector_address set,
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairsFilter {
    pub addresses: Option<Vec<String>>,
    pub first_token_id: Option<String>,
    pub second_token_id: Option<String>,
    pub lp_token_ids: Option<Vec<String>>,
    pub issued_lp_token: Option<bool>,
    pub state: Option<Vec<PairState>>,
    pub fee_state: Option<bool>,
    pub min_volume: Option<String>,
    #[serde(rename = "minLockedValueUSD")]
    pub min_locked_value_usd: Option<String>,
    pub min_trades_count: Option<u64>,
    pub min_trades_count24h: Option<u64>,
    pub min_deployed_at: Option<String>,
    pub has_farms: Option<bool>,
    pub has_dual_farms: Option<bool>,
    pub search_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairSortField {
    #[serde(rename = "DEPLOYED_AT")]
    DeployedAt,
    #[serde(rename = "FEES_24H")]
    Fees24h,
    #[serde(rename = "TRADES_COUNT")]
    TradesCount,
    #[serde(rename = "TRADES_COUNT_24H")]
    TradesCount24h,
    #[serde(rename = "TVL")]
    Tvl,
    #[serde(rename = "VOLUME_24H")]
    Volume24h,
    #[serde(rename = "APR")]
    Apr,
}

impl SortField<Pair> for PairSortField {
    fn sort_value(&self, pair: &Pair) -> StateResult<Decimal> {
        match self {
            PairSortField::DeployedAt => sort_decimal("deployedAt", &pair.deployed_at),
            PairSortField::Fees24h => sort_decimal("feesUSD24h", &pair.fees_usd24h),
            PairSortField::TradesCount => sort_integer(pair.trades_count),
            PairSortField::TradesCount24h => sort_integer(pair.trades_count24h),
            PairSortField::Tvl => sort_decimal("lockedValueUSD", &pair.locked_value_usd),
            PairSortField::Volume24h => sort_decimal("volumeUSD24h", &pair.volume_usd24h),
            PairSortField::Apr => sort_decimal("feesAPR", &pair.fees_apr),
        }
    }
}

pub fn get_pairs(
    tables: &StateTables,
    addresses: &[String],
    mask: &[String],
) -> StateResult<Vec<Projection>> {
    addresses
        .iter()
        .map(|address| {
            let pair = require(tables.pairs.get(address), EntityKind::Pair, address)?;
            project(pair, mask)
        })
        .collect()
}

pub fn get_all_pairs(tables: &StateTables, mask: &[String]) -> StateResult<Vec<Projection>> {
    project_all(tables.pairs.values(), mask)
}

pub fn get_pairs_count(tables: &StateTables) -> usize {
    tables.pairs.len()
}

/// Pairs referencing `token_id` on either side, through the token index.
pub fn get_token_pairs(
    tables: &StateTables,
    token_id: &str,
    mask: &[String],
) -> StateResult<Vec<Projection>> {
    require(tables.tokens.get(token_id), EntityKind::Token, token_id)?;
    tables
        .pairs_for_token(token_id)
        .iter()
        .map(|address| {
            let pair = require(tables.pairs.get(address), EntityKind::Pair, address)?;
            project(pair, mask)
        })
        .collect()
}

pub fn filter_pair_records<'a>(
    tables: &'a StateTables,
    filter: &PairsFilter,
    sort: Option<(PairSortField, SortOrder)>,
    pagination: Pagination,
) -> StateResult<QueryPage<'a, Pair>> {
    let min_volume = threshold("minVolume", filter.min_volume.as_deref())?;
    let min_locked = threshold("minLockedValueUSD", filter.min_locked_value_usd.as_deref())?;
    let min_deployed_at = threshold("minDeployedAt", filter.min_deployed_at.as_deref())?;

    run_query(
        tables.pairs.values(),
        |pair| {
            let accepted = in_set(filter.addresses.as_deref(), &pair.address)
                && exact(filter.first_token_id.as_deref(), pair.first_token_id.as_str())
                && exact(filter.second_token_id.as_deref(), pair.second_token_id.as_str())
                && lp_token_matches(filter, pair)
                && filter
                    .state
                    .as_ref()
                    .map_or(true, |states| states.is_empty() || states.contains(&pair.state))
                && exact(filter.fee_state, pair.fee_state)
                && filter.min_trades_count.map_or(true, |min| pair.trades_count >= min)
                && filter
                    .min_trades_count24h
                    .map_or(true, |min| pair.trades_count24h >= min)
                && exact(filter.has_farms, pair.has_farms)
                && exact(filter.has_dual_farms, pair.has_dual_farms)
                && search_matches(tables, filter.search_token.as_deref(), pair);
            Ok(accepted
                && at_least("volumeUSD24h", &pair.volume_usd24h, min_volume)?
                && at_least("lockedValueUSD", &pair.locked_value_usd, min_locked)?
                && at_least("deployedAt", &pair.deployed_at, min_deployed_at)?)
        },
        sort,
        pagination,
    )
}

pub fn filter_pairs(
    tables: &StateTables,
    filter: &PairsFilter,
    sort: Option<(PairSortField, SortOrder)>,
    pagination: Pagination,
    mask: &[String],
) -> StateResult<(Vec<Projection>, usize)> {
    let page = filter_pair_records(tables, filter, sort, pagination)?;
    Ok((project_all(page.items, mask)?, page.count))
}

fn lp_token_matches(filter: &PairsFilter, pair: &Pair) -> bool {
    let lp = pair.liquidity_pool_token_id.as_deref();
    let issued = filter
        .issued_lp_token
        .map_or(true, |issued| issued == lp.is_some());
    let listed = match filter.lp_token_ids.as_deref() {
        Some(ids) if !ids.is_empty() => lp.map_or(false, |lp| ids.iter().any(|id| id == lp)),
        _ => true,
    };
    issued && listed
}

fn search_matches(tables: &StateTables, search: Option<&str>, pair: &Pair) -> bool {
    let Some(search) = search else {
        return true;
    };
    pair.token_ids().iter().any(|id| {
        let mut fields = vec![*id];
        if let Some(token) = tables.tokens.get(id) {
            fields.push(&token.name);
            fields.push(&token.ticker);
        }
        contains_ignore_case(fields, search)
    })
}

/// Applies masked pair patches. Locked values are recomputed for every
/// patched pair and the active indexes follow `state` transitions.
pub fn update_pairs(
    tables: &mut StateTables,
    patches: &[PairPatch],
    mask: &[String],
) -> StateResult<UpdateOutcome> {
    let staged = patch::stage(&tables.pairs, PAIR_PATCH_FIELDS, patches, mask);

    let mut refreshed = Vec::with_capacity(staged.records.len());
    for (_, mut pair) in staged.records {
        refresh_pair(&mut pair, &tables.tokens)?;
        refreshed.push(pair);
    }

    let updated_count = refreshed.len();
    for pair in refreshed {
        let was_active = tables.is_pair_active(&pair.address);
        if pair.is_active() && !was_active {
            tables.mark_active(&pair.address, pair.token_ids());
        } else if !pair.is_active() && was_active {
            tables.unmark_active(&pair.address, pair.token_ids());
        }
        tables.pairs.set(pair);
    }

    debug!(
        updated = updated_count,
        failed = staged.failed_keys.len(),
        "pairs updated"
    );
    Ok(UpdateOutcome {
        updated_count,
        failed_keys: staged.failed_keys,
    })
}

/// Inserts (or replaces) a pair together with any tokens not yet known.
pub fn add_pair(
    tables: &mut StateTables,
    mut pair: Pair,
    first_token: Token,
    second_token: Token,
) -> StateResult<()> {
    if pair.first_token_id != first_token.identifier
        || pair.second_token_id != second_token.identifier
    {
        return Err(StateError::InvalidSnapshot(format!(
            "pair {} does not reference tokens {} and {}",
            pair.address, first_token.identifier, second_token.identifier
        )));
    }

    for token in [first_token, second_token] {
        if !tables.tokens.contains(&token.identifier) {
            tables.add_token_type(&token.identifier, token.token_type);
            tables.tokens.set(token);
        }
    }

    pair.compounded_apr = CompoundedApr::default();
    refresh_pair(&mut pair, &tables.tokens)?;

    insert_pair(tables, pair);
    Ok(())
}

/// Records the LP token issued for an existing pair.
pub fn add_pair_lp_token(tables: &mut StateTables, address: &str, token: Token) -> StateResult<()> {
    let pair = tables
        .pairs
        .get_mut(address)
        .ok_or_else(|| StateError::not_found(EntityKind::Pair, address))?;
    pair.liquidity_pool_token_id = Some(token.identifier.clone());

    if !tables.tokens.contains(&token.identifier) {
        tables.add_token_type(&token.identifier, token.token_type);
        tables.tokens.set(token);
    }
    Ok(())
}

/// Writes a pair and maintains the token and active indexes.
pub(crate) fn insert_pair(tables: &mut StateTables, pair: Pair) {
    let [first, second] = pair.token_ids();
    tables.link_token_to_pair(first, &pair.address);
    tables.link_token_to_pair(second, &pair.address);
    if pair.is_active() {
        tables.mark_active(&pair.address, pair.token_ids());
    } else {
        tables.unmark_active(&pair.address, pair.token_ids());
    }
    tables.pairs.set(pair);
}
