use serde::{Deserialize, Serialize};

use super::rewards::{GlobalInfoByWeek, WeekTimekeeping};

fn default_zero() -> String {
    "0".to_string()
}

/// Protocol fees collector. There is at most one per snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesCollector {
    pub address: String,
    #[serde(default)]
    pub time: WeekTimekeeping,
    #[serde(default)]
    pub undistributed_rewards: Vec<GlobalInfoByWeek>,
    #[serde(default)]
    pub last_global_update_week: u32,
    #[serde(default)]
    pub all_tokens: Vec<String>,
    #[serde(default)]
    pub known_contracts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_token_id: Option<String>,
    #[serde(default = "default_zero")]
    pub locked_tokens_per_block: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesCollectorPatch {
    pub address: Option<String>,
    pub time: Option<WeekTimekeeping>,
    pub undistributed_rewards: Option<Vec<GlobalInfoByWeek>>,
    pub last_global_update_week: Option<u32>,
    pub all_tokens: Option<Vec<String>>,
    pub known_contracts: Option<Vec<String>>,
    pub locked_token_id: Option<String>,
    pub locked_tokens_per_block: Option<String>,
}
