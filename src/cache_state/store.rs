//! Generation store with readiness gate.
//!
//! A generation is one complete set of tables built by `InitState`. Readers
//! load the current generation and share its lock; masked updates take the
//! write lock of the same generation. A new snapshot is built into fresh
//! tables and published with a single atomic swap, so a reader never observes
//! a partially rebuilt state.

use arc_swap::ArcSwapOption;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::tables::StateTables;
use crate::error::{StateError, StateResult};

#[derive(Debug)]
pub struct Generation {
    id: u64,
    tables: RwLock<StateTables>,
}

impl Generation {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn read(&self) -> RwLockReadGuard<'_, StateTables> {
        self.tables.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, StateTables> {
        self.tables.write()
    }
}

#[derive(Debug, Default)]
pub struct StateStore {
    current: ArcSwapOption<Generation>,
    next_id: AtomicU64,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.current.load().is_some()
    }

    /// Current generation, or `NotReady` before the first publish.
    pub fn generation(&self) -> StateResult<Arc<Generation>> {
        self.current.load_full().ok_or(StateError::NotReady)
    }

    /// Runs `f` against the current tables under the shared lock.
    pub fn read<T>(&self, f: impl FnOnce(&StateTables) -> StateResult<T>) -> StateResult<T> {
        let generation = self.generation()?;
        let tables = generation.read();
        f(&tables)
    }

    /// Runs `f` against the current tables under the exclusive lock.
    pub fn write<T>(
        &self,
        f: impl FnOnce(&mut StateTables) -> StateResult<T>,
    ) -> StateResult<T> {
        let generation = self.generation()?;
        let mut tables = generation.write();
        f(&mut tables)
    }

    /// Publishes `tables` as the new current generation and returns its id.
    pub fn publish(&self, tables: StateTables) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.current.store(Some(Arc::new(Generation {
            id,
            tables: RwLock::new(tables),
        })));
        id
    }
}
