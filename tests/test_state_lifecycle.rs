//! Integration tests for the snapshot lifecycle
//!
//! Tests cover:
//! - InitState round trip (counts and key sets)
//! - Readiness gate before the first publish
//! - Masked updates flowing through compute into linked records
//! - Re-initialization seen atomically by concurrent readers

use dex_state_cache::cache_state::StateStore;
use dex_state_cache::error::StateError;
use dex_state_cache::handlers::pairs::{self, PairSortField, PairsFilter};
use dex_state_cache::handlers::{farms, staking_farms, tokens, Pagination, SortOrder};
use dex_state_cache::initializer::init_state;
use dex_state_cache::settings::ComputeSettings;
use dex_state_cache::types::{FarmPatch, FullSnapshot, StakingFarmPatch, TokenPatch};
use itertools::Itertools;
use std::sync::Arc;
use std::thread;

const P1: &str = "erd1qqqqqqqqqqqqqpgqpairegldmex";
const P3: &str = "erd1qqqqqqqqqqqqqpgqpairutkwegld";
const FARM_A: &str = "erd1qqqqqqqqqqqqqpgqfarmegldmex";
const STAKING_FARM: &str = "erd1qqqqqqqqqqqqqpgqstakeutk";

fn fixture() -> FullSnapshot {
    serde_json::from_str(include_str!("fixtures/snapshot.json")).unwrap()
}

fn strings(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|field| field.to_string()).collect()
}

fn ready_store() -> StateStore {
    let store = StateStore::new();
    init_state(&store, &fixture(), &ComputeSettings::default()).unwrap();
    store
}

/// After InitState, the pair count and key set match the snapshot
#[test]
fn test_init_round_trip() {
    let snapshot = fixture();
    let store = ready_store();

    let count = store.read(|tables| Ok(pairs::get_pairs_count(tables))).unwrap();
    assert_eq!(count, snapshot.pairs.len());

    let addresses: Vec<String> = store
        .read(|tables| pairs::get_all_pairs(tables, &strings(&["address"])))
        .unwrap()
        .into_iter()
        .map(|item| item["address"].as_str().unwrap().to_string())
        .sorted()
        .collect();
    let expected: Vec<String> = snapshot
        .pairs
        .iter()
        .map(|pair| pair.address.clone())
        .sorted()
        .collect();
    assert_eq!(addresses, expected, "every snapshot pair is served back");
}

/// Every operation is rejected with NotReady before the first InitState
#[test]
fn test_not_ready_is_distinct_from_not_found() {
    let store = StateStore::new();
    let err = store
        .read(|tables| pairs::get_pairs(tables, &strings(&[P1]), &[]))
        .unwrap_err();
    assert!(matches!(err, StateError::NotReady));

    let store = ready_store();
    let err = store
        .read(|tables| pairs::get_pairs(tables, &strings(&["erd1nope"]), &[]))
        .unwrap_err();
    assert!(matches!(err, StateError::NotFound { .. }));
}

/// Projected records carry only the masked keys and are detached copies
#[test]
fn test_projection_is_a_detached_copy() {
    let store = ready_store();
    let full = store
        .read(|tables| pairs::get_pairs(tables, &strings(&[P1]), &[]))
        .unwrap();
    let mut projected = store
        .read(|tables| pairs::get_pairs(tables, &strings(&[P1]), &strings(&["state"])))
        .unwrap();

    assert_eq!(projected[0].len(), 1, "only the masked key is present");
    assert_eq!(projected[0]["state"], full[0]["state"]);

    projected[0].insert("state".to_string(), "Inactive".into());
    let again = store
        .read(|tables| pairs::get_pairs(tables, &strings(&[P1]), &strings(&["state"])))
        .unwrap();
    assert_eq!(again[0]["state"], "Active", "cache state is untouched");
}

/// A pure filter is idempotent and count is the pre-pagination match count
#[test]
fn test_filter_idempotent_and_count_pre_pagination() {
    let store = ready_store();
    let run = || {
        store
            .read(|tables| {
                pairs::filter_pairs(
                    tables,
                    &PairsFilter::default(),
                    Some((PairSortField::Volume24h, SortOrder::Desc)),
                    Pagination {
                        offset: 1,
                        limit: Some(2),
                    },
                    &strings(&["address", "volumeUSD24h"]),
                )
            })
            .unwrap()
    };
    let (first, count) = run();
    let (second, _) = run();
    assert_eq!(first, second, "filtering twice yields the same page");
    assert_eq!(count, 4);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0]["address"], P1);
    assert_eq!(first[0]["volumeUSD24h"], "250000");
}

/// Token price updates are picked up by the next farm recomputation
#[test]
fn test_price_update_then_farm_recompute() {
    let store = ready_store();
    let settings = ComputeSettings::default();

    store
        .write(|tables| {
            tokens::update_tokens(
                tables,
                &[TokenPatch {
                    identifier: Some("MEX-455c57".to_string()),
                    price: Some("0.000008".to_string()),
                    ..Default::default()
                }],
                &strings(&["price"]),
            )
        })
        .unwrap();

    // farm APR is unchanged until the farm itself is recomputed
    let base_apr = store
        .read(|tables| Ok(tables.farms.get(FARM_A).unwrap().base_apr.clone()))
        .unwrap();
    assert_eq!(base_apr, "0.021024");

    let outcome = store
        .write(|tables| {
            farms::update_farms(
                tables,
                &[FarmPatch {
                    address: Some(FARM_A.to_string()),
                    produce_rewards_enabled: Some(true),
                    ..Default::default()
                }],
                &strings(&["produceRewardsEnabled"]),
                &settings,
            )
        })
        .unwrap();
    assert_eq!(outcome.updated_count, 1);

    store
        .read(|tables| {
            let farm = tables.farms.get(FARM_A).unwrap();
            assert_eq!(farm.base_apr, "0.042048");
            let pair = tables.pairs.get(P1).unwrap();
            assert_eq!(pair.compounded_apr.farm_base_apr, "0.042048");
            Ok(())
        })
        .unwrap();
}

/// Staking farm updates propagate to the dual-farm APR of the linked pair
#[test]
fn test_staking_update_reaches_pair() {
    let store = ready_store();
    store
        .write(|tables| {
            staking_farms::update_staking_farms(
                tables,
                &[StakingFarmPatch {
                    address: Some(STAKING_FARM.to_string()),
                    produce_rewards_enabled: Some(false),
                    ..Default::default()
                }],
                &strings(&["produceRewardsEnabled"]),
                &ComputeSettings::default(),
            )
        })
        .unwrap();

    store
        .read(|tables| {
            let farm = tables.staking_farms.get(STAKING_FARM).unwrap();
            assert!(!farm.is_producing_rewards);
            assert_eq!(farm.rewards_remaining_days, "0");
            assert!(tables.pairs.get(P3).unwrap().has_dual_farms);
            Ok(())
        })
        .unwrap();
}

/// Readers racing a re-initialization see either the old or the new
/// generation in full, never a pair set from one and farms from the other
#[test]
fn test_reinit_is_atomic_for_readers() {
    let store = Arc::new(ready_store());
    let full = fixture();
    let mut reduced = fixture();
    reduced.pairs.truncate(1);
    reduced.farms.truncate(1);
    reduced.staking_farms.clear();
    reduced.staking_proxies.clear();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    let (pairs, farms) = store
                        .read(|tables| Ok((tables.pairs.len(), tables.farms.len())))
                        .unwrap();
                    assert!(
                        (pairs, farms) == (4, 2) || (pairs, farms) == (1, 1),
                        "observed a mixed generation: {} pairs, {} farms",
                        pairs,
                        farms
                    );
                }
            })
        })
        .collect();

    let settings = ComputeSettings::default();
    for round in 0..20 {
        let snapshot = if round % 2 == 0 { &reduced } else { &full };
        init_state(&store, snapshot, &settings).unwrap();
    }

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(store.generation().unwrap().id(), 21);
}
