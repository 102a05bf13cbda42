//! Entity tables, secondary indexes and the generation store.
//!
//! `tables` owns records and indexes of one generation; `store` publishes
//! generations atomically and gates every call on readiness.

pub mod store;
pub mod tables;

pub use store::{Generation, StateStore};
pub use tables::{Keyed, StateTables, Table};
