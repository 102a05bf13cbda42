use serde::{Deserialize, Serialize};

use super::rewards::{BoostedYieldsFactors, GlobalInfoByWeek, WeekTimekeeping};

fn default_zero() -> String {
    "0".to_string()
}

fn default_state() -> String {
    "Active".to_string()
}

fn default_decimals() -> u32 {
    18
}

/// Single-token staking farm. Fields after `stakingProxyAddress` are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingFarm {
    pub address: String,
    pub farm_token_id: String,
    pub farming_token_id: String,
    pub reward_token_id: String,
    #[serde(default = "default_decimals")]
    pub farm_token_decimals: u32,
    #[serde(default = "default_zero")]
    pub farm_token_supply: String,
    #[serde(default = "default_zero")]
    pub per_block_rewards: String,
    #[serde(default = "default_zero")]
    pub accumulated_rewards: String,
    #[serde(default = "default_zero")]
    pub reward_capacity: String,
    #[serde(default)]
    pub annual_percentage_rewards: u64,
    #[serde(default)]
    pub min_unbond_epochs: u64,
    #[serde(default)]
    pub produce_rewards_enabled: bool,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default)]
    pub boosted_yields_rewards_percentage: u64,
    #[serde(default)]
    pub boosted_yields_factors: BoostedYieldsFactors,
    #[serde(default = "default_zero")]
    pub deployed_at: String,
    #[serde(default)]
    pub time: WeekTimekeeping,
    #[serde(default)]
    pub booster_rewards: Vec<GlobalInfoByWeek>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staking_proxy_address: Option<String>,
    #[serde(default = "default_zero", rename = "farmingTokenPriceUSD")]
    pub farming_token_price_usd: String,
    #[serde(default = "default_zero", rename = "rewardTokenPriceUSD")]
    pub reward_token_price_usd: String,
    #[serde(default = "default_zero", rename = "stakedValueUSD")]
    pub staked_value_usd: String,
    #[serde(default = "default_zero")]
    pub apr: String,
    #[serde(default = "default_zero")]
    pub apr_uncapped: String,
    #[serde(default = "default_zero")]
    pub boosted_apr: String,
    #[serde(default = "default_zero")]
    pub max_boosted_apr: String,
    #[serde(default)]
    pub is_producing_rewards: bool,
    #[serde(default = "default_zero")]
    pub rewards_remaining_days: String,
    #[serde(default = "default_zero")]
    pub rewards_remaining_days_uncapped: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_energy_per_staking: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingFarmPatch {
    pub address: Option<String>,
    pub farm_token_id: Option<String>,
    pub farming_token_id: Option<String>,
    pub reward_token_id: Option<String>,
    pub farm_token_decimals: Option<u32>,
    pub farm_token_supply: Option<String>,
    pub per_block_rewards: Option<String>,
    pub accumulated_rewards: Option<String>,
    pub reward_capacity: Option<String>,
    pub annual_percentage_rewards: Option<u64>,
    pub min_unbond_epochs: Option<u64>,
    pub produce_rewards_enabled: Option<bool>,
    pub state: Option<String>,
    pub boosted_yields_rewards_percentage: Option<u64>,
    pub boosted_yields_factors: Option<BoostedYieldsFactors>,
    pub deployed_at: Option<String>,
    pub time: Option<WeekTimekeeping>,
    pub booster_rewards: Option<Vec<GlobalInfoByWeek>>,
}

/// Contract linking a staking farm to a liquidity pair for dual yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingProxy {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lp_farm_address: Option<String>,
    pub staking_farm_address: String,
    pub pair_address: String,
    pub staking_token_id: String,
    pub farm_token_id: String,
    pub dual_yield_token_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lp_farm_token_id: Option<String>,
    #[serde(default)]
    pub staking_min_unbond_epochs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingProxyPatch {
    pub address: Option<String>,
    pub lp_farm_address: Option<String>,
    pub staking_farm_address: Option<String>,
    pub pair_address: Option<String>,
    pub staking_token_id: Option<String>,
    pub farm_token_id: Option<String>,
    pub dual_yield_token_id: Option<String>,
    pub lp_farm_token_id: Option<String>,
}
