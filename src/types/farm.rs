use serde::{Deserialize, Serialize};

use super::rewards::{BoostedYieldsFactors, GlobalInfoByWeek, WeekTimekeeping};

fn default_zero() -> String {
    "0".to_string()
}

fn default_state() -> String {
    "Active".to_string()
}

/// Farm record (version-agnostic base shape).
///
/// Everything from `farmedTokenPriceUSD` down is derived by
/// [`crate::compute::farm::refresh_farm`] and overwritten on every recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub address: String,
    pub farmed_token_id: String,
    pub farm_token_id: String,
    pub farming_token_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_address: Option<String>,
    #[serde(default = "default_zero")]
    pub per_block_rewards: String,
    #[serde(default = "default_zero")]
    pub farm_token_supply: String,
    #[serde(default = "default_zero")]
    pub farming_token_reserve: String,
    #[serde(default = "default_zero")]
    pub reward_per_share: String,
    #[serde(default = "default_zero")]
    pub reward_reserve: String,
    #[serde(default)]
    pub last_reward_block_nonce: u64,
    #[serde(default = "default_zero")]
    pub division_safety_constant: String,
    #[serde(default)]
    pub produce_rewards_enabled: bool,
    #[serde(default)]
    pub minimum_farming_epochs: u64,
    #[serde(default)]
    pub penalty_percent: u64,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default)]
    pub boosted_yields_rewards_percentage: u64,
    #[serde(default)]
    pub boosted_yields_factors: BoostedYieldsFactors,
    #[serde(default = "default_zero")]
    pub undistributed_boosted_rewards: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_factory_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default = "default_zero")]
    pub deployed_at: String,
    #[serde(default)]
    pub time: WeekTimekeeping,
    #[serde(default)]
    pub booster_rewards: Vec<GlobalInfoByWeek>,
    #[serde(default = "default_zero", rename = "farmedTokenPriceUSD")]
    pub farmed_token_price_usd: String,
    #[serde(default = "default_zero", rename = "farmingTokenPriceUSD")]
    pub farming_token_price_usd: String,
    #[serde(default = "default_zero", rename = "totalValueLockedUSD")]
    pub total_value_locked_usd: String,
    #[serde(default = "default_zero")]
    pub base_apr: String,
    #[serde(default = "default_zero")]
    pub boosted_apr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_energy_per_lp: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmPatch {
    pub address: Option<String>,
    pub farmed_token_id: Option<String>,
    pub farm_token_id: Option<String>,
    pub farming_token_id: Option<String>,
    pub pair_address: Option<String>,
    pub per_block_rewards: Option<String>,
    pub farm_token_supply: Option<String>,
    pub farming_token_reserve: Option<String>,
    pub reward_per_share: Option<String>,
    pub reward_reserve: Option<String>,
    pub last_reward_block_nonce: Option<u64>,
    pub division_safety_constant: Option<String>,
    pub produce_rewards_enabled: Option<bool>,
    pub minimum_farming_epochs: Option<u64>,
    pub penalty_percent: Option<u64>,
    pub state: Option<String>,
    pub boosted_yields_rewards_percentage: Option<u64>,
    pub boosted_yields_factors: Option<BoostedYieldsFactors>,
    pub undistributed_boosted_rewards: Option<String>,
    pub energy_factory_address: Option<String>,
    pub reward_type: Option<String>,
    pub version: Option<String>,
    pub deployed_at: Option<String>,
    pub time: Option<WeekTimekeeping>,
    pub booster_rewards: Option<Vec<GlobalInfoByWeek>>,
}
