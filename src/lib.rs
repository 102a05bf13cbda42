//! # DEX State Cache
//!
//! A snapshot-based, indexed in-memory cache of DEX on-chain state: liquidity
//! pairs, tokens, farms, staking farms, staking proxies and the protocol fees
//! collector. The cache is loaded wholesale from a snapshot and then kept
//! current through masked partial updates, each of which recomputes the
//! derived APR, locked-value and reward-distribution fields of the records it
//! touches.
//!
//! ## Overview
//!
//! - **Entity tables & indexes**: insertion-ordered tables per entity kind plus
//!   the token→pairs, token-by-type and active-pair indexes.
//! - **Query handlers**: point lookups, filter/sort/paginate queries with field
//!   projection, batch partial updates, and the pairs+tokens join.
//! - **Compute services**: weekly timekeeping, reward distribution, farm and
//!   staking APRs, optimal-energy breakeven.
//! - **Snapshot initialization**: dependency-ordered load into fresh tables,
//!   published with a single atomic swap.
//!
//! ## Architecture
//!
//! ### State Layer
//! `cache_state` holds the tables of one generation behind a read/write lock
//! and the store that swaps generations atomically.
//!
//! ### Handler & Compute Layer
//! `handlers` and `compute` are plain functions over the tables; they never
//! take locks themselves.
//!
//! ### RPC Layer
//! `rpc` exposes every operation as a typed method and as a JSON dispatcher
//! keyed by method name.

// Core Types
/// Entity records, patches and the snapshot envelope
pub mod types;
/// Error types and status codes
pub mod error;

// State Layer
/// Entity tables, secondary indexes and the generation store
pub mod cache_state;

// Compute & Handlers
/// Reward, APR and timekeeping computations
pub mod compute;
/// Per-entity query handlers, the query engine and the patch engine
pub mod handlers;
/// Snapshot initialization
pub mod initializer;

// Service
/// RPC façade
pub mod rpc;

// Infrastructure
/// Metrics definitions and helpers
pub mod metrics;
/// Configuration management
pub mod settings;
