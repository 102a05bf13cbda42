//! Entity tables and secondary indexes.
//!
//! `StateTables` is the exclusive owner of every entity record and derived
//! index. It performs no validation and holds no business logic: callers keep
//! referential integrity. Tables preserve insertion order, which is the scan
//! order used to break sort ties.

use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

use crate::types::{FeesCollector, Farm, Pair, StakingFarm, StakingProxy, Token, TokenType};

/// A record stored in a [`Table`], keyed by a stable string identifier.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Token {
    fn key(&self) -> &str {
        &self.identifier
    }
}

impl Keyed for Pair {
    fn key(&self) -> &str {
        &self.address
    }
}

impl Keyed for Farm {
    fn key(&self) -> &str {
        &self.address
    }
}

impl Keyed for StakingFarm {
    fn key(&self) -> &str {
        &self.address
    }
}

impl Keyed for StakingProxy {
    fn key(&self) -> &str {
        &self.address
    }
}

/// Insertion-ordered primary table.
#[derive(Debug, Clone)]
pub struct Table<R> {
    rows: IndexMap<String, R>,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: IndexMap::new(),
        }
    }
}

impl<R: Keyed> Table<R> {
    pub fn get(&self, key: &str) -> Option<&R> {
        self.rows.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut R> {
        self.rows.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    /// Upsert. An existing key keeps its original scan position.
    pub fn set(&mut self, record: R) -> Option<R> {
        self.rows.insert(record.key().to_string(), record)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }
}

/// Every entity table plus the derived indexes, one complete generation.
#[derive(Debug, Clone)]
pub struct StateTables {
    pub tokens: Table<Token>,
    pub pairs: Table<Pair>,
    pub farms: Table<Farm>,
    pub staking_farms: Table<StakingFarm>,
    pub staking_proxies: Table<StakingProxy>,
    /// Singleton slot; `None` means "not loaded", never "not found".
    pub fees_collector: Option<FeesCollector>,
    token_pairs: HashMap<String, Vec<String>>,
    tokens_by_type: HashMap<TokenType, Vec<String>>,
    active_pairs: IndexSet<String>,
    active_pair_tokens: IndexSet<String>,
}

impl Default for StateTables {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTables {
    /// Empty tables with both token-type buckets seeded.
    pub fn new() -> Self {
        let tokens_by_type = TokenType::ALL
            .iter()
            .map(|token_type| (*token_type, Vec::new()))
            .collect();

        Self {
            tokens: Table::default(),
            pairs: Table::default(),
            farms: Table::default(),
            staking_farms: Table::default(),
            staking_proxies: Table::default(),
            fees_collector: None,
            token_pairs: HashMap::new(),
            tokens_by_type,
            active_pairs: IndexSet::new(),
            active_pair_tokens: IndexSet::new(),
        }
    }

    /// Wipes every table and index and re-seeds the token-type buckets.
    pub fn clear_all(&mut self) {
        *self = Self::new();
    }

    /// Records that `pair` references `token` (either side). Idempotent.
    pub fn link_token_to_pair(&mut self, token: &str, pair: &str) {
        let pairs = self.token_pairs.entry(token.to_string()).or_default();
        if !pairs.iter().any(|existing| existing == pair) {
            pairs.push(pair.to_string());
        }
    }

    /// Adds `token` to its type bucket. Idempotent.
    pub fn add_token_type(&mut self, token: &str, token_type: TokenType) {
        let bucket = self.tokens_by_type.entry(token_type).or_default();
        if !bucket.iter().any(|existing| existing == token) {
            bucket.push(token.to_string());
        }
    }

    /// Marks `pair` active and both of its tokens as participating in an
    /// active pair.
    pub fn mark_active(&mut self, pair: &str, tokens: [&str; 2]) {
        self.active_pairs.insert(pair.to_string());
        for token in tokens {
            self.active_pair_tokens.insert(token.to_string());
        }
    }

    /// Removes `pair` from the active set. A token leaves the active-token set
    /// only when no remaining active pair references it.
    pub fn unmark_active(&mut self, pair: &str, tokens: [&str; 2]) {
        if !self.active_pairs.shift_remove(pair) {
            return;
        }
        for token in tokens {
            let still_active = self
                .token_pairs
                .get(token)
                .map(|pairs| pairs.iter().any(|p| self.active_pairs.contains(p)))
                .unwrap_or(false);
            if !still_active {
                self.active_pair_tokens.shift_remove(token);
            }
        }
    }

    pub fn pairs_for_token(&self, token: &str) -> &[String] {
        self.token_pairs
            .get(token)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn tokens_of_type(&self, token_type: TokenType) -> &[String] {
        self.tokens_by_type
            .get(&token_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_pair_active(&self, pair: &str) -> bool {
        self.active_pairs.contains(pair)
    }

    pub fn is_token_in_active_pair(&self, token: &str) -> bool {
        self.active_pair_tokens.contains(token)
    }

    pub fn active_pairs(&self) -> impl Iterator<Item = &str> {
        self.active_pairs.iter().map(String::as_str)
    }

    pub fn active_pair_tokens(&self) -> impl Iterator<Item = &str> {
        self.active_pair_tokens.iter().map(String::as_str)
    }
}
