// src/metrics.rs

#[cfg(feature = "observability")]
pub use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
    increment_counter, Unit,
};

// NOTE: When observability feature is disabled, provide stub implementations
#[cfg(not(feature = "observability"))]
pub enum Unit {
    Count,
    Milliseconds,
}

// Macros for metrics when observability is disabled
#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! counter {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {{
        let _ = $value;
    }};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! gauge {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {{
        let _ = $value;
    }};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! histogram {
    ($name:expr, $value:expr $(, $label:expr => $label_value:expr)* $(,)?) => {{
        let _ = $value;
    }};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! increment_counter {
    ($name:expr $(, $label:expr => $label_value:expr)* $(,)?) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_counter {
    ($name:expr, $unit:expr, $desc:expr) => {};
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_gauge {
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
#[macro_export]
macro_rules! describe_histogram {
    ($name:expr, $unit:expr, $desc:expr) => {};
    ($name:expr, $desc:expr) => {};
}

#[cfg(not(feature = "observability"))]
use crate::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
    increment_counter,
};

use std::time::Duration;

use crate::types::{EntityKind, InitCounts};

/// Initializes the descriptions for all the metrics in the application.
/// This should be called once at startup.
pub fn describe_metrics() {
    describe_gauge!("dex_state_up", "Server process liveness (1=up).");

    // RPC surface
    describe_counter!(
        "dex_state_rpc_calls_total",
        Unit::Count,
        "Total number of RPC calls, labeled by method."
    );
    describe_counter!(
        "dex_state_rpc_errors_total",
        Unit::Count,
        "Total number of failed RPC calls, labeled by method and status."
    );
    describe_histogram!(
        "dex_state_rpc_latency_ms",
        Unit::Milliseconds,
        "RPC handling latency in milliseconds, labeled by method."
    );

    // Snapshot lifecycle
    describe_gauge!(
        "dex_state_generation",
        "Id of the currently published table generation."
    );
    describe_gauge!(
        "dex_state_table_size",
        "Number of records per entity table after the last publish."
    );
    describe_histogram!(
        "dex_state_snapshot_build_ms",
        Unit::Milliseconds,
        "Time to build and publish a snapshot generation."
    );
    describe_counter!(
        "dex_state_snapshot_failures_total",
        Unit::Count,
        "Snapshot loads rejected before publish."
    );

    // Updates
    describe_counter!(
        "dex_state_updated_records_total",
        Unit::Count,
        "Records written by masked updates, labeled by entity."
    );
    describe_counter!(
        "dex_state_update_failed_keys_total",
        Unit::Count,
        "Update keys absent from their table, labeled by entity."
    );
}

pub fn set_up() {
    gauge!("dex_state_up", 1.0);
}

pub fn record_rpc_call(method: &str) {
    increment_counter!("dex_state_rpc_calls_total", "method" => method.to_string());
}

pub fn record_rpc_error(method: &str, status: &'static str) {
    increment_counter!(
        "dex_state_rpc_errors_total",
        "method" => method.to_string(),
        "status" => status
    );
}

pub fn record_rpc_latency(method: &str, duration: Duration) {
    histogram!(
        "dex_state_rpc_latency_ms",
        duration.as_secs_f64() * 1000.0,
        "method" => method.to_string()
    );
}

pub fn set_generation(generation: u64) {
    gauge!("dex_state_generation", generation as f64);
}

pub fn set_table_sizes(counts: &InitCounts) {
    let sizes = [
        (EntityKind::Token, counts.tokens),
        (EntityKind::Pair, counts.pairs),
        (EntityKind::Farm, counts.farms),
        (EntityKind::StakingFarm, counts.staking_farms),
        (EntityKind::StakingProxy, counts.staking_proxies),
        (EntityKind::FeesCollector, counts.fees_collector),
    ];
    for (kind, size) in sizes {
        gauge!("dex_state_table_size", size as f64, "entity" => kind.as_str());
    }
}

pub fn record_snapshot_build(duration: Duration) {
    histogram!(
        "dex_state_snapshot_build_ms",
        duration.as_secs_f64() * 1000.0
    );
}

pub fn increment_snapshot_failures() {
    increment_counter!("dex_state_snapshot_failures_total");
}

pub fn record_update(kind: EntityKind, updated: usize, failed: usize) {
    counter!(
        "dex_state_updated_records_total",
        updated as u64,
        "entity" => kind.as_str()
    );
    if failed > 0 {
        counter!(
            "dex_state_update_failed_keys_total",
            failed as u64,
            "entity" => kind.as_str()
        );
    }
}
