//! Per-entity query handlers.
//!
//! Handlers are plain functions over [`StateTables`](crate::cache_state::StateTables);
//! the RPC service decides which lock they run under.

#[macro_use]
pub mod patch;
pub mod query;

pub mod farms;
pub mod fees_collector;
pub mod pairs;
pub mod pairs_tokens;
pub mod staking_farms;
pub mod staking_proxies;
pub mod timekeeping;
pub mod tokens;

pub use patch::UpdateOutcome;
pub use query::{Pagination, Projection, SortOrder};
