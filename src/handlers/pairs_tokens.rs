//! Pairs joined with their first, second and LP token records.

use serde_json::Value;

use super::pairs::{filter_pair_records, PairSortField, PairsFilter};
use super::query::{project, require, Pagination, Projection, SortOrder};
use super::tokens::get_tokens;
use crate::cache_state::StateTables;
use crate::error::StateResult;
use crate::types::EntityKind;

const TOKEN_REFERENCES: [(&str, &str); 3] = [
    ("firstTokenId", "firstToken"),
    ("secondTokenId", "secondToken"),
    ("liquidityPoolTokenId", "liquidityPoolToken"),
];

/// The pair mask extended with the token reference fields the join needs,
/// and the names that were added and must be stripped afterwards.
fn join_mask(pair_mask: &[String]) -> (Vec<String>, Vec<&'static str>) {
    if pair_mask.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let mut mask = pair_mask.to_vec();
    let mut forced = Vec::new();
    for (reference, _) in TOKEN_REFERENCES {
        if !mask.iter().any(|field| field == reference) {
            mask.push(reference.to_string());
            forced.push(reference);
        }
    }
    (mask, forced)
}

fn attach_tokens(
    tables: &StateTables,
    mut pair: Projection,
    token_mask: &[String],
    forced: &[&str],
) -> StateResult<Projection> {
    for (reference, joined) in TOKEN_REFERENCES {
        let token_id = match pair.get(reference) {
            Some(Value::String(id)) => id.clone(),
            _ => continue,
        };
        let token = get_tokens(tables, &[token_id], token_mask)?
            .into_iter()
            .next()
            .map(Value::Object)
            .unwrap_or(Value::Null);
        pair.insert(joined.to_string(), token);
    }
    for reference in forced {
        pair.remove(*reference);
    }
    Ok(pair)
}

pub fn get_pairs_with_tokens(
    tables: &StateTables,
    addresses: &[String],
    pair_mask: &[String],
    token_mask: &[String],
) -> StateResult<Vec<Projection>> {
    let (mask, forced) = join_mask(pair_mask);
    addresses
        .iter()
        .map(|address| {
            let pair = require(tables.pairs.get(address), EntityKind::Pair, address)?;
            attach_tokens(tables, project(pair, &mask)?, token_mask, &forced)
        })
        .collect()
}

pub fn filter_pairs_with_tokens(
    tables: &StateTables,
    filter: &PairsFilter,
    sort: Option<(PairSortField, SortOrder)>,
    pagination: Pagination,
    pair_mask: &[String],
    token_mask: &[String],
) -> StateResult<(Vec<Projection>, usize)> {
    let (mask, forced) = join_mask(pair_mask);
    let page = filter_pair_records(tables, filter, sort, pagination)?;
    let items = page
        .items
        .into_iter()
        .map(|pair| attach_tokens(tables, project(pair, &mask)?, token_mask, &forced))
        .collect::<StateResult<Vec<_>>>()?;
    Ok((items, page.count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StateError;
    use crate::handlers::test_support::{loaded_tables, mask, P1, P4};
    use crate::types::PairState;

    #[test]
    fn test_forced_references_are_stripped() {
        let tables = loaded_tables();
        let items = get_pairs_with_tokens(
            &tables,
            &[P1.to_string()],
            &mask(&["address", "firstTokenId"]),
            &mask(&["ticker"]),
        )
        .unwrap();
        let pair = &items[0];
        assert_eq!(pair["address"], P1);
        assert_eq!(pair["firstTokenId"], "WEGLD-bd4d79");
        assert!(pair.get("secondTokenId").is_none());
        assert!(pair.get("liquidityPoolTokenId").is_none());
        assert_eq!(pair["firstToken"]["ticker"], "WEGLD");
        assert_eq!(pair["secondToken"]["ticker"], "MEX");
        assert_eq!(pair["liquidityPoolToken"]["ticker"], "EGLDMEX");
        assert_eq!(pair["firstToken"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_full_mask_keeps_references() {
        let tables = loaded_tables();
        let items = get_pairs_with_tokens(&tables, &[P4.to_string()], &[], &[]).unwrap();
        let pair = &items[0];
        assert_eq!(pair["secondTokenId"], "USDC-c76f1f");
        assert_eq!(pair["secondToken"]["decimals"], 6);
        // no LP token issued yet
        assert!(pair.get("liquidityPoolToken").is_none());
    }

    #[test]
    fn test_filtered_join_keeps_count() {
        let tables = loaded_tables();
        let (items, count) = filter_pairs_with_tokens(
            &tables,
            &PairsFilter {
                state: Some(vec![PairState::Active]),
                ..Default::default()
            },
            None,
            Pagination {
                offset: 1,
                limit: Some(1),
            },
            &mask(&["address"]),
            &mask(&["identifier"]),
        )
        .unwrap();
        assert_eq!(count, 3);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["secondToken"]["identifier"], "USDC-c76f1f");
        assert_eq!(items[0].len(), 4);
    }

    #[test]
    fn test_missing_pair_fails() {
        let tables = loaded_tables();
        let err = get_pairs_with_tokens(&tables, &["erd1nope".to_string()], &[], &[]).unwrap_err();
        assert!(matches!(err, StateError::NotFound { kind: EntityKind::Pair, .. }));
    }
}
