//! Shared filter / sort / paginate / project engine.
//!
//! A query scans a table once in insertion order, keeps the records accepted
//! by the predicate chain, optionally sorts them by a decimal-valued field
//! (stable, so ties keep scan order) and slices out the requested page.
//! `count` is always the number of matches before pagination.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::compute::decimal;
use crate::error::{StateError, StateResult};
use crate::types::EntityKind;

/// A record reduced to the fields named by a field mask.
pub type Projection = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub offset: usize,
    /// `None` returns everything after `offset`.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// A sortable field of `R`, resolved to a decimal value per record.
pub trait SortField<R>: Copy {
    fn sort_value(&self, record: &R) -> StateResult<Decimal>;
}

#[derive(Debug)]
pub struct QueryPage<'a, R> {
    pub items: Vec<&'a R>,
    pub count: usize,
}

pub fn run_query<'a, R, S, F>(
    records: impl Iterator<Item = &'a R>,
    mut predicate: F,
    sort: Option<(S, SortOrder)>,
    pagination: Pagination,
) -> StateResult<QueryPage<'a, R>>
where
    R: 'a,
    S: SortField<R>,
    F: FnMut(&R) -> StateResult<bool>,
{
    let mut candidates = Vec::new();
    for record in records {
        if predicate(record)? {
            candidates.push(record);
        }
    }
    let count = candidates.len();

    if let Some((field, order)) = sort {
        let mut keyed = candidates
            .into_iter()
            .map(|record| Ok((field.sort_value(record)?, record)))
            .collect::<StateResult<Vec<_>>>()?;
        match order {
            SortOrder::Asc => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
            SortOrder::Desc => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
        }
        candidates = keyed.into_iter().map(|(_, record)| record).collect();
    }

    let items = paginate(candidates, pagination);
    Ok(QueryPage { items, count })
}

pub fn paginate<T>(items: Vec<T>, pagination: Pagination) -> Vec<T> {
    let iter = items.into_iter().skip(pagination.offset);
    match pagination.limit {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}

/// Serializes `record` and keeps only the top-level keys named in `mask`.
/// An empty mask keeps everything; names the record does not carry are omitted.
pub fn project<R: Serialize>(record: &R, mask: &[String]) -> StateResult<Projection> {
    let full = match serde_json::to_value(record)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if mask.is_empty() {
        return Ok(full);
    }
    Ok(full
        .into_iter()
        .filter(|(key, _)| mask.iter().any(|field| field == key))
        .collect())
}

pub fn project_all<'a, R: Serialize + 'a>(
    records: impl IntoIterator<Item = &'a R>,
    mask: &[String],
) -> StateResult<Vec<Projection>> {
    records
        .into_iter()
        .map(|record| project(record, mask))
        .collect()
}

/// Parses an optional filter threshold; a malformed threshold is the caller's error.
pub fn threshold(field: &'static str, value: Option<&str>) -> StateResult<Option<Decimal>> {
    value.map(|raw| decimal(field, raw)).transpose()
}

/// `value >= min`, or true when there is no threshold.
pub fn at_least(field: &'static str, value: &str, min: Option<Decimal>) -> StateResult<bool> {
    match min {
        Some(min) => Ok(decimal(field, value)? >= min),
        None => Ok(true),
    }
}

/// Set membership; an absent or empty set does not constrain.
pub fn in_set(set: Option<&[String]>, value: &str) -> bool {
    match set {
        Some(values) if !values.is_empty() => values.iter().any(|v| v == value),
        _ => true,
    }
}

/// Exact match; an absent expectation does not constrain.
pub fn exact<T: PartialEq>(expected: Option<T>, actual: T) -> bool {
    expected.map_or(true, |expected| expected == actual)
}

/// Case-insensitive substring match of `needle` in any of `haystacks`.
pub fn contains_ignore_case<'a>(haystacks: impl IntoIterator<Item = &'a str>, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    haystacks
        .into_iter()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
}

pub(crate) fn sort_decimal(field: &'static str, value: &str) -> StateResult<Decimal> {
    decimal(field, value)
}

pub(crate) fn sort_integer(value: u64) -> StateResult<Decimal> {
    Ok(Decimal::from(value))
}

/// Resolves a point-lookup key; a missing key fails the whole call.
pub(crate) fn require<'a, R>(record: Option<&'a R>, kind: EntityKind, key: &str) -> StateResult<&'a R> {
    record.ok_or_else(|| StateError::not_found(kind, key))
}
