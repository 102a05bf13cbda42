//! Snapshot initialization.
//!
//! `InitState` builds a complete set of tables off to the side, loading
//! entities in dependency order (tokens, pairs, farms, staking farms, staking
//! proxies, fees collector), and publishes them in one swap. A snapshot that
//! fails validation or compute leaves the published generation untouched.

use anyhow::Context;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::cache_state::{StateStore, StateTables};
use crate::compute::distribution::refresh_fees_collector;
use crate::compute::farm::refresh_farm;
use crate::compute::pair::refresh_pair;
use crate::compute::staking::refresh_staking_farm;
use crate::error::{StateError, StateResult};
use crate::handlers::farms::store_farm;
use crate::handlers::pairs::insert_pair;
use crate::handlers::staking_proxies::store_staking_proxy;
use crate::metrics;
use crate::settings::ComputeSettings;
use crate::types::{FullSnapshot, InitCounts};

fn invalid(reason: String) -> StateError {
    StateError::InvalidSnapshot(reason)
}

fn require_tokens(tables: &StateTables, owner: &str, token_ids: &[&str]) -> StateResult<()> {
    match token_ids.iter().find(|id| !tables.tokens.contains(id)) {
        Some(missing) => Err(invalid(format!(
            "{} references unknown token {}",
            owner, missing
        ))),
        None => Ok(()),
    }
}

/// Builds fresh tables from `snapshot` without publishing them.
pub fn build_tables(
    snapshot: &FullSnapshot,
    settings: &ComputeSettings,
) -> StateResult<(StateTables, InitCounts)> {
    let mut tables = StateTables::new();

    for token in &snapshot.tokens {
        tables.add_token_type(&token.identifier, token.token_type);
        tables.tokens.set(token.clone());
    }

    for pair in &snapshot.pairs {
        require_tokens(&tables, &format!("pair {}", pair.address), &pair.token_ids())?;
        let mut pair = pair.clone();
        refresh_pair(&mut pair, &tables.tokens)?;
        insert_pair(&mut tables, pair);
    }

    for farm in &snapshot.farms {
        require_tokens(
            &tables,
            &format!("farm {}", farm.address),
            &[farm.farmed_token_id.as_str(), farm.farming_token_id.as_str()],
        )?;
        if let Some(pair_address) = farm.pair_address.as_deref() {
            if !tables.pairs.contains(pair_address) {
                return Err(invalid(format!(
                    "farm {} references unknown pair {}",
                    farm.address, pair_address
                )));
            }
        }
        let mut farm = farm.clone();
        refresh_farm(&mut farm, &tables.tokens, settings)?;
        store_farm(&mut tables, farm);
    }

    for staking_farm in &snapshot.staking_farms {
        require_tokens(
            &tables,
            &format!("staking farm {}", staking_farm.address),
            &[
                staking_farm.farming_token_id.as_str(),
                staking_farm.reward_token_id.as_str(),
            ],
        )?;
        let mut staking_farm = staking_farm.clone();
        refresh_staking_farm(&mut staking_farm, &tables.tokens, settings)?;
        tables.staking_farms.set(staking_farm);
    }

    for proxy in &snapshot.staking_proxies {
        if !tables.pairs.contains(&proxy.pair_address) {
            return Err(invalid(format!(
                "staking proxy {} references unknown pair {}",
                proxy.address, proxy.pair_address
            )));
        }
        if !tables.staking_farms.contains(&proxy.staking_farm_address) {
            return Err(invalid(format!(
                "staking proxy {} references unknown staking farm {}",
                proxy.address, proxy.staking_farm_address
            )));
        }
        store_staking_proxy(&mut tables, proxy.clone());
    }

    if let Some(collector) = &snapshot.fees_collector {
        let mut collector = collector.clone();
        refresh_fees_collector(&mut collector, &tables.tokens, settings)?;
        tables.fees_collector = Some(collector);
    }

    let counts = InitCounts {
        tokens: tables.tokens.len(),
        pairs: tables.pairs.len(),
        farms: tables.farms.len(),
        staking_farms: tables.staking_farms.len(),
        staking_proxies: tables.staking_proxies.len(),
        fees_collector: usize::from(tables.fees_collector.is_some()),
    };
    Ok((tables, counts))
}

/// Builds and publishes a new generation from `snapshot`; returns the
/// generation id and the per-kind record counts.
pub fn init_state(
    store: &StateStore,
    snapshot: &FullSnapshot,
    settings: &ComputeSettings,
) -> StateResult<(u64, InitCounts)> {
    let started = Instant::now();
    let (tables, counts) = match build_tables(snapshot, settings) {
        Ok(built) => built,
        Err(e) => {
            metrics::increment_snapshot_failures();
            warn!(error = %e, "snapshot rejected; keeping the published generation");
            return Err(e);
        }
    };

    let generation = store.publish(tables);
    let elapsed = started.elapsed();
    metrics::set_generation(generation);
    metrics::set_table_sizes(&counts);
    metrics::record_snapshot_build(elapsed);
    info!(
        generation,
        tokens = counts.tokens,
        pairs = counts.pairs,
        farms = counts.farms,
        staking_farms = counts.staking_farms,
        staking_proxies = counts.staking_proxies,
        fees_collector = counts.fees_collector,
        elapsed_ms = elapsed.as_millis() as u64,
        "published dex state generation"
    );
    Ok((generation, counts))
}

/// Reads a `FullSnapshot` JSON document from disk.
pub async fn load_snapshot_file(path: impl AsRef<Path>) -> anyhow::Result<FullSnapshot> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading snapshot file {}", path.display()))?;
    let snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parsing snapshot file {}", path.display()))?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::test_support::fixture;
    use crate::error::StatusCode;
    use std::io::Write;

    #[test]
    fn test_counts_per_entity_kind() {
        let (tables, counts) = build_tables(&fixture(), &ComputeSettings::default()).unwrap();
        assert_eq!(
            counts,
            InitCounts {
                tokens: 8,
                pairs: 4,
                farms: 2,
                staking_farms: 1,
                staking_proxies: 1,
                fees_collector: 1,
            }
        );
        assert_eq!(tables.pairs_for_token("WEGLD-bd4d79").len(), 3);
        assert_eq!(tables.active_pairs().count(), 3);
    }

    #[test]
    fn test_rejects_pair_with_unknown_token() {
        let mut snapshot = fixture();
        snapshot.tokens.retain(|token| token.identifier != "BHAT-c1fde3");
        let err = build_tables(&snapshot, &ComputeSettings::default()).unwrap_err();
        assert!(matches!(err, StateError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_rejects_farms_with_unknown_tokens() {
        let mut snapshot = fixture();
        snapshot.farms[0].farmed_token_id = "GHOST-000000".to_string();
        let err = build_tables(&snapshot, &ComputeSettings::default()).unwrap_err();
        assert!(matches!(err, StateError::InvalidSnapshot(_)));
        assert_eq!(err.status(), StatusCode::InvalidArgument);

        let mut snapshot = fixture();
        snapshot.staking_farms[0].reward_token_id = "GHOST-000000".to_string();
        let err = build_tables(&snapshot, &ComputeSettings::default()).unwrap_err();
        assert!(matches!(err, StateError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_failed_init_keeps_published_generation() {
        let store = StateStore::new();
        init_state(&store, &fixture(), &ComputeSettings::default()).unwrap();

        let mut broken = fixture();
        broken.staking_proxies[0].pair_address = "erd1nowhere".to_string();
        assert!(init_state(&store, &broken, &ComputeSettings::default()).is_err());

        let generation = store.generation().unwrap();
        assert_eq!(generation.id(), 1);
        assert_eq!(generation.read().staking_proxies.len(), 1);
    }

    #[test]
    fn test_reinit_replaces_state() {
        let store = StateStore::new();
        init_state(&store, &fixture(), &ComputeSettings::default()).unwrap();

        let mut smaller = fixture();
        smaller.staking_proxies.clear();
        smaller.staking_farms.clear();
        smaller.farms.clear();
        smaller.pairs.truncate(1);
        let (id, counts) = init_state(&store, &smaller, &ComputeSettings::default()).unwrap();
        assert_eq!(id, 2);
        assert_eq!(counts.pairs, 1);

        let generation = store.generation().unwrap();
        let tables = generation.read();
        assert_eq!(tables.pairs.len(), 1);
        assert!(!tables.pairs.values().any(|pair| pair.has_farms));
    }

    #[tokio::test]
    async fn test_load_snapshot_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(include_bytes!("../tests/fixtures/snapshot.json"))
            .unwrap();
        let snapshot = load_snapshot_file(file.path()).await.unwrap();
        assert_eq!(snapshot.pairs.len(), 4);

        let missing = load_snapshot_file("/nonexistent/snapshot.json").await;
        assert!(missing.is_err());
    }
}
