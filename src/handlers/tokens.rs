use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::patch::{self, Patch, PatchField, UpdateOutcome};
use super::query::{
    at_least, contains_ignore_case, exact, in_set, project, project_all, require, run_query,
    sort_decimal, sort_integer, threshold, Pagination, Projection, SortField, SortOrder,
};
use crate::cache_state::StateTables;
use crate::error::StateResult;
use crate::types::{EntityKind, Token, TokenPatch, TokenType};

impl Patch for TokenPatch {
    fn key(&self) -> Option<&str> {
        self.identifier.as_deref()
    }
}

static TOKEN_PATCH_FIELDS: &[PatchField<Token, TokenPatch>] = patch_fields!(Token, TokenPatch;
    "identifier" => identifier immutable,
    "decimals" => decimals immutable,
    "type" => token_type immutable,
    "name" => name set,
    "ticker" => ticker set,
    "owner" => owner set,
    "price" => price set,
    "derivedEGLD" => derived_egld set,
    "previous24hPrice" => previous24h_price set,
    "previous7dPrice" => previous7d_price set,
    "priceChange24h" => price_change24h set,
    "volumeUSD24h" => volume_usd24h set,
    "previous24hVolume" => previous24h_volume set,
    "liquidityUSD" => liquidity_usd set,
    "supply" => supply set,
    "circulatingSupply" => circulating_supply set,
    "tradesCount" => trades_count set,
    "tradesCount24h" => trades_count24h set,
    "createdAt" => created_at set,
    "trendingScore" => trending_score set,
    "isPaused" => is_paused set,
    "pairAddress" => pair_address set,
    "roles" => roles set,
    "assets" => assets set,
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensFilter {
    pub identifiers: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub token_type: Option<TokenType>,
    /// Only tokens traded (or not) in at least one active pair.
    pub enabled_swaps: Option<bool>,
    pub min_liquidity: Option<String>,
    pub search_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenSortField {
    #[serde(rename = "PRICE")]
    Price,
    #[serde(rename = "PREVIOUS_24H_PRICE")]
    Previous24hPrice,
    #[serde(rename = "PREVIOUS_7D_PRICE")]
    Previous7dPrice,
    #[serde(rename = "PRICE_CHANGE_24H")]
    PriceChange24h,
    #[serde(rename = "VOLUME")]
    Volume,
    #[serde(rename = "PREVIOUS_24H_VOLUME")]
    Previous24hVolume,
    #[serde(rename = "LIQUIDITY")]
    Liquidity,
    #[serde(rename = "TRADES_COUNT")]
    TradesCount,
    #[serde(rename = "CREATED_AT")]
    CreatedAt,
    #[serde(rename = "TRENDING_SCORE")]
    TrendingScore,
}

impl SortField<Token> for TokenSortField {
    fn sort_value(&self, token: &Token) -> StateResult<Decimal> {
        match self {
            TokenSortField::Price => sort_decimal("price", &token.price),
            TokenSortField::Previous24hPrice => {
                sort_decimal("previous24hPrice", &token.previous24h_price)
            }
            TokenSortField::Previous7dPrice => {
                sort_decimal("previous7dPrice", &token.previous7d_price)
            }
            TokenSortField::PriceChange24h => sort_decimal("priceChange24h", &token.price_change24h),
            TokenSortField::Volume => sort_decimal("volumeUSD24h", &token.volume_usd24h),
            TokenSortField::Previous24hVolume => {
                sort_decimal("previous24hVolume", &token.previous24h_volume)
            }
            TokenSortField::Liquidity => sort_decimal("liquidityUSD", &token.liquidity_usd),
            TokenSortField::TradesCount => sort_integer(token.trades_count),
            TokenSortField::CreatedAt => sort_decimal("createdAt", &token.created_at),
            TokenSortField::TrendingScore => sort_decimal("trendingScore", &token.trending_score),
        }
    }
}

pub fn get_tokens(
    tables: &StateTables,
    identifiers: &[String],
    mask: &[String],
) -> StateResult<Vec<Projection>> {
    identifiers
        .iter()
        .map(|identifier| {
            let token = require(tables.tokens.get(identifier), EntityKind::Token, identifier)?;
            project(token, mask)
        })
        .collect()
}

pub fn get_all_tokens(tables: &StateTables, mask: &[String]) -> StateResult<Vec<Projection>> {
    project_all(tables.tokens.values(), mask)
}

pub fn get_tokens_count(tables: &StateTables) -> usize {
    tables.tokens.len()
}

pub fn filter_tokens(
    tables: &StateTables,
    filter: &TokensFilter,
    sort: Option<(TokenSortField, SortOrder)>,
    pagination: Pagination,
    mask: &[String],
) -> StateResult<(Vec<Projection>, usize)> {
    let min_liquidity = threshold("minLiquidity", filter.min_liquidity.as_deref())?;

    // A type filter scans its bucket instead of the whole table.
    let candidates: Box<dyn Iterator<Item = &Token> + '_> = match filter.token_type {
        Some(token_type) => Box::new(
            tables
                .tokens_of_type(token_type)
                .iter()
                .filter_map(|identifier| tables.tokens.get(identifier)),
        ),
        None => Box::new(tables.tokens.values()),
    };

    let page = run_query(
        candidates,
        |token| {
            let accepted = in_set(filter.identifiers.as_deref(), &token.identifier)
                && exact(
                    filter.enabled_swaps,
                    tables.is_token_in_active_pair(&token.identifier),
                )
                && filter.search_token.as_deref().map_or(true, |search| {
                    contains_ignore_case(
                        [
                            token.identifier.as_str(),
                            token.name.as_str(),
                            token.ticker.as_str(),
                        ],
                        search,
                    )
                });
            Ok(accepted && at_least("liquidityUSD", &token.liquidity_usd, min_liquidity)?)
        },
        sort,
        pagination,
    )?;
    Ok((project_all(page.items, mask)?, page.count))
}

/// Applies masked token patches. Token prices feed pair and farm compute on
/// their next recomputation; pairs are not refreshed here.
pub fn update_tokens(
    tables: &mut StateTables,
    patches: &[TokenPatch],
    mask: &[String],
) -> StateResult<UpdateOutcome> {
    let staged = patch::stage(&tables.tokens, TOKEN_PATCH_FIELDS, patches, mask);
    let updated_count = staged.records.len();
    for (_, token) in staged.records {
        tables.tokens.set(token);
    }
    debug!(
        updated = updated_count,
        failed = staged.failed_keys.len(),
        "tokens updated"
    );
    Ok(UpdateOutcome {
        updated_count,
        failed_keys: staged.failed_keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{loaded_tables, mask};

    fn identifiers(items: &[Projection]) -> Vec<&str> {
        items
            .iter()
            .map(|item| item["identifier"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_filter_by_type_uses_bucket_order() {
        let tables = loaded_tables();
        let filter = TokensFilter {
            token_type: Some(TokenType::FungibleLp),
            ..Default::default()
        };
        let (items, count) = filter_tokens(&tables, &filter, None, Pagination::default(), &[]).unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            identifiers(&items),
            ["EGLDMEX-0be9e5", "EGLDUSDC-594e5e", "UTKWEGLD-c960d1"]
        );
    }

    #[test]
    fn test_filter_enabled_swaps_and_liquidity() {
        let tables = loaded_tables();
        let filter = TokensFilter {
            enabled_swaps: Some(false),
            ..Default::default()
        };
        let (items, _) = filter_tokens(
            &tables,
            &filter,
            None,
            Pagination::default(),
            &mask(&["identifier"]),
        )
        .unwrap();
        // BHAT only trades in an inactive pair; LP tokens are not pair sides
        assert!(identifiers(&items).contains(&"BHAT-c1fde3"));
        assert!(!identifiers(&items).contains(&"MEX-455c57"));

        let liquid = TokensFilter {
            min_liquidity: Some("2000000".to_string()),
            search_token: Some("w".to_string()),
            ..Default::default()
        };
        let (items, count) = filter_tokens(
            &tables,
            &liquid,
            Some((TokenSortField::Liquidity, SortOrder::Desc)),
            Pagination::default(),
            &mask(&["identifier"]),
        )
        .unwrap();
        assert_eq!(count, 2);
        assert_eq!(identifiers(&items), ["WEGLD-bd4d79", "USDC-c76f1f"]);
    }

    #[test]
    fn test_sort_by_trending_score() {
        let tables = loaded_tables();
        let filter = TokensFilter {
            token_type: Some(TokenType::Fungible),
            ..Default::default()
        };
        let (items, _) = filter_tokens(
            &tables,
            &filter,
            Some((TokenSortField::TrendingScore, SortOrder::Desc)),
            Pagination {
                offset: 0,
                limit: Some(2),
            },
            &mask(&["identifier"]),
        )
        .unwrap();
        assert_eq!(identifiers(&items), ["MEX-455c57", "WEGLD-bd4d79"]);
    }

    #[test]
    fn test_update_skips_immutable_decimals() {
        let mut tables = loaded_tables();
        let outcome = update_tokens(
            &mut tables,
            &[TokenPatch {
                identifier: Some("MEX-455c57".to_string()),
                decimals: Some(6),
                price: Some("0.000005".to_string()),
                ..Default::default()
            }],
            &mask(&["decimals", "price"]),
        )
        .unwrap();
        assert_eq!(outcome.updated_count, 1);
        let mex = tables.tokens.get("MEX-455c57").unwrap();
        assert_eq!(mex.decimals, 18);
        assert_eq!(mex.price, "0.000005");
    }

    #[test]
    fn test_returned_records_are_copies() {
        let tables = loaded_tables();
        let mut items = get_tokens(&tables, &["USDC-c76f1f".to_string()], &[]).unwrap();
        items[0].insert("price".to_string(), serde_json::json!("999"));
        let again = get_tokens(&tables, &["USDC-c76f1f".to_string()], &mask(&["price"])).unwrap();
        assert_eq!(again[0]["price"], "1");
    }
}
