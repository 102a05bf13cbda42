//! JSON dispatch by method name, used by the line-delimited server.

use serde_json::{Map, Value};

use super::service::DexStateService;
use super::RpcError;

macro_rules! rpc_methods {
    ($($name:literal => $method:ident),* $(,)?) => {
        /// Every method name accepted by [`DexStateService::dispatch`].
        pub const METHODS: &[&str] = &[$($name),*];

        impl DexStateService {
            /// Decodes `params` into the method's request, runs it and
            /// encodes the response. `null` params decode as `{}`.
            pub fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
                let params = match params {
                    Value::Null => Value::Object(Map::new()),
                    other => other,
                };
                match method {
                    $($name => {
                        let request = serde_json::from_value(params).map_err(RpcError::InvalidRequest)?;
                        let response = self.$method(request)?;
                        serde_json::to_value(response).map_err(RpcError::Encode)
                    })*
                    _ => Err(RpcError::UnknownMethod(method.to_string())),
                }
            }
        }
    };
}

rpc_methods! {
    "InitState" => init_state,

    "GetPairs" => get_pairs,
    "GetAllPairs" => get_all_pairs,
    "GetFilteredPairs" => get_filtered_pairs,
    "GetPairsCount" => get_pairs_count,
    "GetTokenPairs" => get_token_pairs,
    "UpdatePairs" => update_pairs,
    "AddPair" => add_pair,
    "AddPairLpToken" => add_pair_lp_token,
    "GetPairsWithTokens" => get_pairs_with_tokens,
    "GetFilteredPairsWithTokens" => get_filtered_pairs_with_tokens,

    "GetTokens" => get_tokens,
    "GetAllTokens" => get_all_tokens,
    "GetFilteredTokens" => get_filtered_tokens,
    "GetTokensCount" => get_tokens_count,
    "UpdateTokens" => update_tokens,

    "GetFarms" => get_farms,
    "GetAllFarms" => get_all_farms,
    "GetFilteredFarms" => get_filtered_farms,
    "UpdateFarms" => update_farms,

    "GetStakingFarms" => get_staking_farms,
    "GetAllStakingFarms" => get_all_staking_farms,
    "GetFilteredStakingFarms" => get_filtered_staking_farms,
    "UpdateStakingFarms" => update_staking_farms,

    "GetStakingProxies" => get_staking_proxies,
    "GetAllStakingProxies" => get_all_staking_proxies,
    "GetFilteredStakingProxies" => get_filtered_staking_proxies,
    "UpdateStakingProxies" => update_staking_proxies,

    "GetFeesCollector" => get_fees_collector,
    "UpdateFeesCollector" => update_fees_collector,
    "GetWeeklyTimekeeping" => get_weekly_timekeeping,
    "UpdateWeeklyTimekeeping" => update_weekly_timekeeping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache_state::StateStore;
    use crate::error::StatusCode;
    use crate::settings::ComputeSettings;
    use serde_json::json;
    use std::sync::Arc;

    fn service() -> DexStateService {
        DexStateService::new(Arc::new(StateStore::new()), ComputeSettings::default())
    }

    #[test]
    fn test_unknown_method() {
        let err = service().dispatch("DropTables", Value::Null).unwrap_err();
        assert!(matches!(err, RpcError::UnknownMethod(_)));
        assert_eq!(err.status(), StatusCode::InvalidArgument);
    }

    #[test]
    fn test_malformed_params() {
        let err = service()
            .dispatch("GetPairs", json!({ "addresses": "not-a-list" }))
            .unwrap_err();
        assert!(matches!(err, RpcError::InvalidRequest(_)));
    }

    #[test]
    fn test_null_params_reach_readiness_gate() {
        let err = service().dispatch("GetAllTokens", Value::Null).unwrap_err();
        assert_eq!(err.status(), StatusCode::Unavailable);
    }

    #[test]
    fn test_method_names_are_unique() {
        let mut names = METHODS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), METHODS.len());
    }
}
