use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::messages::*;
use super::RpcError;
use crate::cache_state::StateStore;
use crate::error::StateResult;
use crate::handlers::farms::{self, FarmSortField, FarmsFilter};
use crate::handlers::fees_collector;
use crate::handlers::pairs::{self, PairSortField, PairsFilter};
use crate::handlers::pairs_tokens;
use crate::handlers::staking_farms::{self, StakingFarmSortField, StakingFarmsFilter};
use crate::handlers::staking_proxies::{self, StakingProxiesFilter, StakingProxySortField};
use crate::handlers::timekeeping;
use crate::handlers::tokens::{self, TokenSortField, TokensFilter};
use crate::handlers::{Pagination, Projection, UpdateOutcome};
use crate::initializer;
use crate::metrics;
use crate::settings::ComputeSettings;
use crate::types::{
    EntityKind, FarmPatch, PairPatch, StakingFarmPatch, StakingProxyPatch, TokenPatch,
    WeekTimekeepingPatch,
};

/// Entry point of every remote procedure. Queries run under the shared lock
/// of the current generation, updates and adds under its exclusive lock.
#[derive(Debug, Clone)]
pub struct DexStateService {
    store: Arc<StateStore>,
    compute: ComputeSettings,
}

impl DexStateService {
    pub fn new(store: Arc<StateStore>, compute: ComputeSettings) -> Self {
        Self { store, compute }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    fn observe<T>(
        &self,
        method: &'static str,
        call: impl FnOnce() -> StateResult<T>,
    ) -> Result<T, RpcError> {
        let started = Instant::now();
        metrics::record_rpc_call(method);
        let result = call().map_err(RpcError::from);
        metrics::record_rpc_latency(method, started.elapsed());
        if let Err(e) = &result {
            metrics::record_rpc_error(method, e.status().as_str());
            debug!(method, error = %e, "rpc call failed");
        }
        result
    }

    fn observe_update(
        &self,
        method: &'static str,
        kind: EntityKind,
        call: impl FnOnce() -> StateResult<UpdateOutcome>,
    ) -> Result<UpdateOutcome, RpcError> {
        let outcome = self.observe(method, call)?;
        metrics::record_update(kind, outcome.updated_count, outcome.failed_keys.len());
        Ok(outcome)
    }

    // Pairs

    pub fn get_pairs(&self, request: AddressesRequest) -> Result<ItemsResponse, RpcError> {
        self.observe("GetPairs", || {
            self.store.read(|tables| {
                let items = pairs::get_pairs(tables, &request.addresses, &request.field_mask)?;
                Ok(ItemsResponse { items })
            })
        })
    }

    pub fn get_all_pairs(&self, request: FieldMaskRequest) -> Result<ItemsResponse, RpcError> {
        self.observe("GetAllPairs", || {
            self.store.read(|tables| {
                let items = pairs::get_all_pairs(tables, &request.field_mask)?;
                Ok(ItemsResponse { items })
            })
        })
    }

    pub fn get_filtered_pairs(
        &self,
        request: FilteredRequest<PairsFilter, PairSortField>,
    ) -> Result<FilteredResponse, RpcError> {
        self.observe("GetFilteredPairs", || {
            self.store.read(|tables| {
                let (items, count) = pairs::filter_pairs(
                    tables,
                    &request.filters,
                    request.sort(),
                    request.pagination(),
                    &request.field_mask,
                )?;
                Ok(FilteredResponse { items, count })
            })
        })
    }

    pub fn get_pairs_count(&self, _request: EmptyRequest) -> Result<CountResponse, RpcError> {
        self.observe("GetPairsCount", || {
            self.store.read(|tables| {
                Ok(CountResponse {
                    count: pairs::get_pairs_count(tables),
                })
            })
        })
    }

    pub fn get_token_pairs(&self, request: TokenPairsRequest) -> Result<ItemsResponse, RpcError> {
        self.observe("GetTokenPairs", || {
            self.store.read(|tables| {
                let items = pairs::get_token_pairs(tables, &request.token_id, &request.field_mask)?;
                Ok(ItemsResponse { items })
            })
        })
    }

    pub fn update_pairs(
        &self,
        request: UpdateRequest<PairPatch>,
    ) -> Result<UpdateOutcome, RpcError> {
        self.observe_update("UpdatePairs", EntityKind::Pair, || {
            self.store.write(|tables| {
                pairs::update_pairs(tables, &request.partials, &request.update_mask)
            })
        })
    }

    pub fn add_pair(&self, request: AddPairRequest) -> Result<EmptyResponse, RpcError> {
        self.observe("AddPair", || {
            self.store.write(|tables| {
                pairs::add_pair(tables, request.pair, request.first_token, request.second_token)?;
                Ok(EmptyResponse {})
            })
        })
    }

    pub fn add_pair_lp_token(
        &self,
        request: AddPairLpTokenRequest,
    ) -> Result<EmptyResponse, RpcError> {
        self.observe("AddPairLpToken", || {
            self.store.write(|tables| {
                pairs::add_pair_lp_token(tables, &request.address, request.token)?;
                Ok(EmptyResponse {})
            })
        })
    }

    pub fn get_pairs_with_tokens(
        &self,
        request: PairsWithTokensRequest,
    ) -> Result<ItemsResponse, RpcError> {
        self.observe("GetPairsWithTokens", || {
            self.store.read(|tables| {
                let items = pairs_tokens::get_pairs_with_tokens(
                    tables,
                    &request.addresses,
                    &request.pair_field_mask,
                    &request.token_field_mask,
                )?;
                Ok(ItemsResponse { items })
            })
        })
    }

    pub fn get_filtered_pairs_with_tokens(
        &self,
        request: FilteredPairsWithTokensRequest,
    ) -> Result<FilteredResponse, RpcError> {
        self.observe("GetFilteredPairsWithTokens", || {
            self.store.read(|tables| {
                let (items, count) = pairs_tokens::filter_pairs_with_tokens(
                    tables,
                    &request.filters,
                    request.sort_field.map(|field| (field, request.sort_order)),
                    Pagination {
                        offset: request.offset,
                        limit: request.limit,
                    },
                    &request.pair_field_mask,
                    &request.token_field_mask,
                )?;
                Ok(FilteredResponse { items, count })
            })
        })
    }

    // Tokens

    pub fn get_tokens(&self, request: IdentifiersRequest) -> Result<ItemsResponse, RpcError> {
        self.observe("GetTokens", || {
            self.store.read(|tables| {
                let items = tokens::get_tokens(tables, &request.identifiers, &request.field_mask)?;
                Ok(ItemsResponse { items })
            })
        })
    }

    pub fn get_all_tokens(&self, request: FieldMaskRequest) -> Result<ItemsResponse, RpcError> {
        self.observe("GetAllTokens", || {
            self.store.read(|tables| {
                let items = tokens::get_all_tokens(tables, &request.field_mask)?;
                Ok(ItemsResponse { items })
            })
        })
    }

    pub fn get_filtered_tokens(
        &self,
        request: FilteredRequest<TokensFilter, TokenSortField>,
    ) -> Result<FilteredResponse, RpcError> {
        self.observe("GetFilteredTokens", || {
            self.store.read(|tables| {
                let (items, count) = tokens::filter_tokens(
                    tables,
                    &request.filters,
                    request.sort(),
                    request.pagination(),
                    &request.field_mask,
                )?;
                Ok(FilteredResponse { items, count })
            })
        })
    }

    pub fn get_tokens_count(&self, _request: EmptyRequest) -> Result<CountResponse, RpcError> {
        self.observe("GetTokensCount", || {
            self.store.read(|tables| {
                Ok(CountResponse {
                    count: tokens::get_tokens_count(tables),
                })
            })
        })
    }

    pub fn update_tokens(
        &self,
        request: UpdateRequest<TokenPatch>,
    ) -> Result<UpdateOutcome, RpcError> {
        self.observe_update("UpdateTokens", EntityKind::Token, || {
            self.store.write(|tables| {
                tokens::update_tokens(tables, &request.partials, &request.update_mask)
            })
        })
    }

    // Farms

    pub fn get_farms(&self, request: AddressesRequest) -> Result<ItemsResponse, RpcError> {
        self.observe("GetFarms", || {
            self.store.read(|tables| {
                let items = farms::get_farms(tables, &request.addresses, &request.field_mask)?;
                Ok(ItemsResponse { items })
            })
        })
    }

    pub fn get_all_farms(&self, request: FieldMaskRequest) -> Result<ItemsResponse, RpcError> {
        self.observe("GetAllFarms", || {
            self.store.read(|tables| {
                let items = farms::get_all_farms(tables, &request.field_mask)?;
                Ok(ItemsResponse { items })
            })
        })
    }

    pub fn get_filtered_farms(
        &self,
        request: FilteredRequest<FarmsFilter, FarmSortField>,
    ) -> Result<FilteredResponse, RpcError> {
        self.observe("GetFilteredFarms", || {
            self.store.read(|tables| {
                let (items, count) = farms::filter_farms(
                    tables,
                    &request.filters,
                    request.sort(),
                    request.pagination(),
                    &request.field_mask,
                )?;
                Ok(FilteredResponse { items, count })
            })
        })
    }

    pub fn update_farms(&self, request: UpdateRequest<FarmPatch>) -> Result<UpdateOutcome, RpcError> {
        self.observe_update("UpdateFarms", EntityKind::Farm, || {
            self.store.write(|tables| {
                farms::update_farms(tables, &request.partials, &request.update_mask, &self.compute)
            })
        })
    }

    // Staking farms

    pub fn get_staking_farms(&self, request: AddressesRequest) -> Result<ItemsResponse, RpcError> {
        self.observe("GetStakingFarms", || {
            self.store.read(|tables| {
                let items = staking_farms::get_staking_farms(
                    tables,
                    &request.addresses,
                    &request.field_mask,
                )?;
                Ok(ItemsResponse { items })
            })
        })
    }

    pub fn get_all_staking_farms(
        &self,
        request: FieldMaskRequest,
    ) -> Result<ItemsResponse, RpcError> {
        self.observe("GetAllStakingFarms", || {
            self.store.read(|tables| {
                let items = staking_farms::get_all_staking_farms(tables, &request.field_mask)?;
                Ok(ItemsResponse { items })
            })
        })
    }

    pub fn get_filtered_staking_farms(
        &self,
        request: FilteredRequest<StakingFarmsFilter, StakingFarmSortField>,
    ) -> Result<FilteredResponse, RpcError> {
        self.observe("GetFilteredStakingFarms", || {
            self.store.read(|tables| {
                let (items, count) = staking_farms::filter_staking_farms(
                    tables,
                    &request.filters,
                    request.sort(),
                    request.pagination(),
                    &request.field_mask,
                )?;
                Ok(FilteredResponse { items, count })
            })
        })
    }

    pub fn update_staking_farms(
        &self,
        request: UpdateRequest<StakingFarmPatch>,
    ) -> Result<UpdateOutcome, RpcError> {
        self.observe_update("UpdateStakingFarms", EntityKind::StakingFarm, || {
            self.store.write(|tables| {
                staking_farms::update_staking_farms(
                    tables,
                    &request.partials,
                    &request.update_mask,
                    &self.compute,
                )
            })
        })
    }

    // Staking proxies

    pub fn get_staking_proxies(
        &self,
        request: AddressesRequest,
    ) -> Result<ItemsResponse, RpcError> {
        self.observe("GetStakingProxies", || {
            self.store.read(|tables| {
                let items = staking_proxies::get_staking_proxies(
                    tables,
                    &request.addresses,
                    &request.field_mask,
                )?;
                Ok(ItemsResponse { items })
            })
        })
    }

    pub fn get_all_staking_proxies(
        &self,
        request: FieldMaskRequest,
    ) -> Result<ItemsResponse, RpcError> {
        self.observe("GetAllStakingProxies", || {
            self.store.read(|tables| {
                let items = staking_proxies::get_all_staking_proxies(tables, &request.field_mask)?;
                Ok(ItemsResponse { items })
            })
        })
    }

    pub fn get_filtered_staking_proxies(
        &self,
        request: FilteredRequest<StakingProxiesFilter, StakingProxySortField>,
    ) -> Result<FilteredResponse, RpcError> {
        self.observe("GetFilteredStakingProxies", || {
            self.store.read(|tables| {
                let (items, count) = staking_proxies::filter_staking_proxies(
                    tables,
                    &request.filters,
                    request.sort(),
                    request.pagination(),
                    &request.field_mask,
                )?;
                Ok(FilteredResponse { items, count })
            })
        })
    }

    pub fn update_staking_proxies(
        &self,
        request: UpdateRequest<StakingProxyPatch>,
    ) -> Result<UpdateOutcome, RpcError> {
        self.observe_update("UpdateStakingProxies", EntityKind::StakingProxy, || {
            self.store.write(|tables| {
                staking_proxies::update_staking_proxies(
                    tables,
                    &request.partials,
                    &request.update_mask,
                )
            })
        })
    }

    // Fees collector and timekeeping

    pub fn get_fees_collector(
        &self,
        request: FieldMaskRequest,
    ) -> Result<FeesCollectorResponse, RpcError> {
        self.observe("GetFeesCollector", || {
            self.store.read(|tables| {
                let fees_collector =
                    fees_collector::get_fees_collector(tables, &request.field_mask)?;
                Ok(FeesCollectorResponse { fees_collector })
            })
        })
    }

    pub fn update_fees_collector(
        &self,
        request: UpdateFeesCollectorRequest,
    ) -> Result<UpdateOutcome, RpcError> {
        self.observe_update("UpdateFeesCollector", EntityKind::FeesCollector, || {
            self.store.write(|tables| {
                fees_collector::update_fees_collector(
                    tables,
                    &request.partial,
                    &request.update_mask,
                    &self.compute,
                )
            })
        })
    }

    pub fn get_weekly_timekeeping(
        &self,
        request: WeeklyTimekeepingRequest,
    ) -> Result<Projection, RpcError> {
        self.observe("GetWeeklyTimekeeping", || {
            self.store.read(|tables| {
                timekeeping::get_weekly_timekeeping(tables, &request.sc_address, &request.field_mask)
            })
        })
    }

    pub fn update_weekly_timekeeping(
        &self,
        request: UpdateRequest<WeekTimekeepingPatch>,
    ) -> Result<UpdateOutcome, RpcError> {
        self.observe_update("UpdateWeeklyTimekeeping", EntityKind::Timekeeping, || {
            self.store.write(|tables| {
                timekeeping::update_weekly_timekeeping(
                    tables,
                    &request.partials,
                    &request.update_mask,
                    &self.compute,
                )
            })
        })
    }

    // Lifecycle

    /// Builds a new generation from the snapshot and publishes it. This is the
    /// only call accepted before the store is ready.
    pub fn init_state(&self, request: InitStateRequest) -> Result<InitStateResponse, RpcError> {
        self.observe("InitState", || {
            let (generation, counts) =
                initializer::init_state(&self.store, &request.snapshot, &self.compute)?;
            Ok(InitStateResponse { generation, counts })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::test_support::fixture;
    use crate::error::{StateError, StatusCode};

    fn ready_service() -> DexStateService {
        let service = DexStateService::new(Arc::new(StateStore::new()), ComputeSettings::default());
        service
            .init_state(InitStateRequest { snapshot: fixture() })
            .unwrap();
        service
    }

    #[test]
    fn test_calls_before_init_are_unavailable() {
        let service = DexStateService::new(Arc::new(StateStore::new()), ComputeSettings::default());
        let err = service.get_all_pairs(FieldMaskRequest::default()).unwrap_err();
        assert!(matches!(err, RpcError::State(StateError::NotReady)));
        assert_eq!(err.status(), StatusCode::Unavailable);

        let err = service
            .update_tokens(UpdateRequest {
                partials: Vec::new(),
                update_mask: Vec::new(),
            })
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::Unavailable);
    }

    #[test]
    fn test_init_then_count() {
        let service = ready_service();
        let count = service.get_pairs_count(EmptyRequest {}).unwrap();
        assert_eq!(count.count, 4);
        let count = service.get_tokens_count(EmptyRequest {}).unwrap();
        assert_eq!(count.count, 8);
    }

    #[test]
    fn test_missing_key_is_not_found_status() {
        let service = ready_service();
        let err = service
            .get_farms(AddressesRequest {
                addresses: vec!["erd1nope".to_string()],
                field_mask: Vec::new(),
            })
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NotFound);
    }
}
