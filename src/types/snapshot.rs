use serde::{Deserialize, Serialize};

use super::{FeesCollector, Farm, Pair, StakingFarm, StakingProxy, Token};

/// Full state snapshot handed to `InitState`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullSnapshot {
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub pairs: Vec<Pair>,
    #[serde(default)]
    pub farms: Vec<Farm>,
    #[serde(default)]
    pub staking_farms: Vec<StakingFarm>,
    #[serde(default)]
    pub staking_proxies: Vec<StakingProxy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees_collector: Option<FeesCollector>,
}

/// Number of records loaded per entity kind by one `InitState`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitCounts {
    pub tokens: usize,
    pub pairs: usize,
    pub farms: usize,
    pub staking_farms: usize,
    pub staking_proxies: usize,
    pub fees_collector: usize,
}
