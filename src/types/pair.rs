use serde::{Deserialize, Serialize};

fn default_zero() -> String {
    "0".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairState {
    Active,
    Inactive,
    ActiveNoSwaps,
    PartialActive,
}

/// Raw reserves of a pair, scaled by the respective token decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairInfo {
    pub reserves0: String,
    pub reserves1: String,
    pub total_supply: String,
}

impl Default for PairInfo {
    fn default() -> Self {
        Self {
            reserves0: default_zero(),
            reserves1: default_zero(),
            total_supply: default_zero(),
        }
    }
}

/// Nested reserves patch; each field merges independently into `PairInfo`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairInfoPatch {
    pub reserves0: Option<String>,
    pub reserves1: Option<String>,
    pub total_supply: Option<String>,
}

/// Fee APR of the pair plus the farm and dual-farm contributions linked to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundedApr {
    #[serde(rename = "feesAPR")]
    pub fees_apr: String,
    #[serde(rename = "farmBaseAPR")]
    pub farm_base_apr: String,
    #[serde(rename = "farmBoostedAPR")]
    pub farm_boosted_apr: String,
    #[serde(rename = "dualFarmBaseAPR")]
    pub dual_farm_base_apr: String,
    #[serde(rename = "dualFarmBoostedAPR")]
    pub dual_farm_boosted_apr: String,
}

impl Default for CompoundedApr {
    fn default() -> Self {
        Self {
            fees_apr: default_zero(),
            farm_base_apr: default_zero(),
            farm_boosted_apr: default_zero(),
            dual_farm_base_apr: default_zero(),
            dual_farm_boosted_apr: default_zero(),
        }
    }
}

/// Liquidity pair record. Locked values and `compoundedAPR` are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    pub address: String,
    pub first_token_id: String,
    pub second_token_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity_pool_token_id: Option<String>,
    #[serde(default)]
    pub info: PairInfo,
    #[serde(default = "default_zero")]
    pub first_token_price: String,
    #[serde(default = "default_zero", rename = "firstTokenPriceUSD")]
    pub first_token_price_usd: String,
    #[serde(default = "default_zero")]
    pub second_token_price: String,
    #[serde(default = "default_zero", rename = "secondTokenPriceUSD")]
    pub second_token_price_usd: String,
    #[serde(default = "default_zero", rename = "liquidityPoolTokenPriceUSD")]
    pub liquidity_pool_token_price_usd: String,
    #[serde(default = "default_zero", rename = "firstTokenLockedValueUSD")]
    pub first_token_locked_value_usd: String,
    #[serde(default = "default_zero", rename = "secondTokenLockedValueUSD")]
    pub second_token_locked_value_usd: String,
    #[serde(default = "default_zero", rename = "lockedValueUSD")]
    pub locked_value_usd: String,
    #[serde(default = "default_zero", rename = "previous24hLockedValueUSD")]
    pub previous24h_locked_value_usd: String,
    #[serde(default = "default_zero")]
    pub first_token_volume24h: String,
    #[serde(default = "default_zero")]
    pub second_token_volume24h: String,
    #[serde(default = "default_zero", rename = "volumeUSD24h")]
    pub volume_usd24h: String,
    #[serde(default = "default_zero", rename = "previous24hVolumeUSD")]
    pub previous24h_volume_usd: String,
    #[serde(default = "default_zero", rename = "feesUSD24h")]
    pub fees_usd24h: String,
    #[serde(default = "default_zero", rename = "previous24hFeesUSD")]
    pub previous24h_fees_usd: String,
    #[serde(default = "default_zero", rename = "feesAPR")]
    pub fees_apr: String,
    #[serde(default = "default_zero")]
    pub total_fee_percent: String,
    #[serde(default = "default_zero")]
    pub special_fee_percent: String,
    #[serde(default)]
    pub fee_state: bool,
    pub state: PairState,
    #[serde(default)]
    pub trades_count: u64,
    #[serde(default)]
    pub trades_count24h: u64,
    #[serde(default = "default_zero")]
    pub deployed_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_liquidity_adder: Option<String>,
    #[serde(default)]
    pub trusted_swap_pairs: Vec<String>,
    #[serde(default)]
    pub has_farms: bool,
    #[serde(default)]
    pub has_dual_farms: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staking_farm_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staking_proxy_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees_collector_address: Option<String>,
    #[serde(default, rename = "compoundedAPR")]
    pub compounded_apr: CompoundedApr,
}

impl Pair {
    pub fn is_active(&self) -> bool {
        self.state == PairState::Active
    }

    /// Token identifiers referenced by this pair, LP token excluded.
    pub fn token_ids(&self) -> [&str; 2] {
        [&self.first_token_id, &self.second_token_id]
    }
}

/// Partial pair keyed by `address`. Back-references and derived fields are
/// maintained by the cache and cannot be patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairPatch {
    pub address: Option<String>,
    pub first_token_id: Option<String>,
    pub second_token_id: Option<String>,
    pub liquidity_pool_token_id: Option<String>,
    pub info: Option<PairInfoPatch>,
    pub first_token_price: Option<String>,
    #[serde(rename = "firstTokenPriceUSD")]
    pub first_token_price_usd: Option<String>,
    pub second_token_price: Option<String>,
    #[serde(rename = "secondTokenPriceUSD")]
    pub second_token_price_usd: Option<String>,
    #[serde(rename = "liquidityPoolTokenPriceUSD")]
    pub liquidity_pool_token_price_usd: Option<String>,
    #[serde(rename = "previous24hLockedValueUSD")]
    pub previous24h_locked_value_usd: Option<String>,
    pub first_token_volume24h: Option<String>,
    pub second_token_volume24h: Option<String>,
    #[serde(rename = "volumeUSD24h")]
    pub volume_usd24h: Option<String>,
    #[serde(rename = "previous24hVolumeUSD")]
    pub previous24h_volume_usd: Option<String>,
    #[serde(rename = "feesUSD24h")]
    pub fees_usd24h: Option<String>,
    #[serde(rename = "previous24hFeesUSD")]
    pub previous24h_fees_usd: Option<String>,
    #[serde(rename = "feesAPR")]
    pub fees_apr: Option<String>,
    pub total_fee_percent: Option<String>,
    pub special_fee_percent: Option<String>,
    pub fee_state: Option<bool>,
    pub state: Option<PairState>,
    pub trades_count: Option<u64>,
    pub trades_count24h: Option<u64>,
    pub deployed_at: Option<String>,
    pub initial_liquidity_adder: Option<String>,
    pub trusted_swap_pairs: Option<Vec<String>>,
    pub fees_collector_address: Option<String>,
}
