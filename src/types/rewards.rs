//! Weekly reward shapes shared by farms, staking farms and the fees collector.

use serde::{Deserialize, Serialize};

fn default_zero() -> String {
    "0".to_string()
}

/// A token amount paid out (or accrued) for a week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EsdtTokenPayment {
    pub token_identifier: String,
    #[serde(default)]
    pub token_nonce: u64,
    /// Raw on-chain amount, scaled by the token's decimals.
    pub amount: String,
}

/// Share of a week's rewards (in USD terms) carried by one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDistribution {
    pub token_id: String,
    /// Percentage with four decimal places, e.g. "33.3333".
    pub percentage: String,
}

/// Week boundaries of a contract that distributes rewards per week.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekTimekeeping {
    #[serde(default)]
    pub sc_address: String,
    pub current_week: u32,
    pub first_week_start_epoch: u64,
    #[serde(default)]
    pub start_epoch_for_week: u64,
    #[serde(default)]
    pub end_epoch_for_week: u64,
}

/// Partial update of a contract's week boundaries, keyed by `scAddress`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekTimekeepingPatch {
    pub sc_address: Option<String>,
    pub current_week: Option<u32>,
    pub first_week_start_epoch: Option<u64>,
}

/// Booster rewards recorded for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalInfoByWeek {
    pub week: u32,
    #[serde(default)]
    pub total_rewards_for_week: Vec<EsdtTokenPayment>,
    #[serde(default = "default_zero")]
    pub total_energy_for_week: String,
    #[serde(default = "default_zero")]
    pub total_locked_tokens_for_week: String,
    #[serde(default)]
    pub rewards_distribution_for_week: Vec<TokenDistribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apr: Option<String>,
}

/// Boosted-yield weights of a farm or staking farm.
///
/// The optimal-energy breakeven uses `maxRewardsFactor` (u),
/// `userRewardsFarm` (A) and `userRewardsEnergy` (B).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostedYieldsFactors {
    pub max_rewards_factor: String,
    pub user_rewards_energy: String,
    pub user_rewards_farm: String,
    #[serde(default = "default_zero")]
    pub min_energy_amount: String,
    #[serde(default = "default_zero")]
    pub min_farm_amount: String,
}

impl Default for BoostedYieldsFactors {
    fn default() -> Self {
        Self {
            max_rewards_factor: default_zero(),
            user_rewards_energy: default_zero(),
            user_rewards_farm: default_zero(),
            min_energy_amount: default_zero(),
            min_farm_amount: default_zero(),
        }
    }
}
