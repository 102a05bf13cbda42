use serde::{Deserialize, Serialize};

fn default_zero() -> String {
    "0".to_string()
}

/// ESDT token kind. The cache keeps exactly one bucket per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    #[serde(rename = "FungibleESDT")]
    Fungible,
    #[serde(rename = "FungibleESDT-LP")]
    FungibleLp,
}

impl TokenType {
    pub const ALL: [TokenType; 2] = [TokenType::Fungible, TokenType::FungibleLp];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Fungible => "FungibleESDT",
            TokenType::FungibleLp => "FungibleESDT-LP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRole {
    pub address: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub can_local_mint: bool,
    #[serde(default)]
    pub can_local_burn: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAssets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_url: Option<String>,
}

/// Token record as held by the cache. Market fields are USD decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub identifier: String,
    pub name: String,
    pub ticker: String,
    pub decimals: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(default = "default_zero")]
    pub price: String,
    #[serde(default = "default_zero", rename = "derivedEGLD")]
    pub derived_egld: String,
    #[serde(default = "default_zero")]
    pub previous24h_price: String,
    #[serde(default = "default_zero")]
    pub previous7d_price: String,
    #[serde(default = "default_zero")]
    pub price_change24h: String,
    #[serde(default = "default_zero", rename = "volumeUSD24h")]
    pub volume_usd24h: String,
    #[serde(default = "default_zero")]
    pub previous24h_volume: String,
    #[serde(default = "default_zero", rename = "liquidityUSD")]
    pub liquidity_usd: String,
    #[serde(default = "default_zero")]
    pub supply: String,
    #[serde(default = "default_zero")]
    pub circulating_supply: String,
    #[serde(default)]
    pub trades_count: u64,
    #[serde(default)]
    pub trades_count24h: u64,
    #[serde(default = "default_zero")]
    pub created_at: String,
    #[serde(default = "default_zero")]
    pub trending_score: String,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<TokenRole>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<TokenAssets>,
}

/// Partial token keyed by `identifier`; `None` means "not carried by this patch".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPatch {
    pub identifier: Option<String>,
    pub name: Option<String>,
    pub ticker: Option<String>,
    pub decimals: Option<u32>,
    pub owner: Option<String>,
    #[serde(rename = "type")]
    pub token_type: Option<TokenType>,
    pub price: Option<String>,
    #[serde(rename = "derivedEGLD")]
    pub derived_egld: Option<String>,
    pub previous24h_price: Option<String>,
    pub previous7d_price: Option<String>,
    pub price_change24h: Option<String>,
    #[serde(rename = "volumeUSD24h")]
    pub volume_usd24h: Option<String>,
    pub previous24h_volume: Option<String>,
    #[serde(rename = "liquidityUSD")]
    pub liquidity_usd: Option<String>,
    pub supply: Option<String>,
    pub circulating_supply: Option<String>,
    pub trades_count: Option<u64>,
    pub trades_count24h: Option<u64>,
    pub created_at: Option<String>,
    pub trending_score: Option<String>,
    pub is_paused: Option<bool>,
    pub pair_address: Option<String>,
    pub roles: Option<Vec<TokenRole>>,
    pub assets: Option<TokenAssets>,
}
