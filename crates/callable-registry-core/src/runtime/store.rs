// crates/callable-registry-core/src/runtime/store.rs
// ============================================================================
// Module: Callable Registry In-Memory Store
// Description: Simple in-memory callable store for tests and embedding.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces, crate::runtime::{gate, record}
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`CallableStore`] and
//! [`UnitOfWork`] for every callable kind. It enforces the same uniqueness
//! rules as durable stores, keeps the same append-only scope ledger behind
//! `count_by_name_and_module`, and rolls back a failed unit of work from a
//! snapshot. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::core::Callable;
use crate::core::CallableId;
use crate::core::CallableKind;
use crate::core::CallableVersion;
use crate::interfaces::CallableStore;
use crate::interfaces::RegistryError;
use crate::interfaces::StoreError;
use crate::interfaces::UnitOfWork;
use crate::runtime::gate::TransactionGate;
use crate::runtime::record::StoredCallable;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// (kind, name, module) key of one version scope.
type ScopeKey = (CallableKind, String, String);

/// Store contents guarded by one mutex.
///
/// # Invariants
/// - `scopes` is append-only: every (scope, identifier) pair ever saved stays
///   recorded with the version it carried, even after a rename moves the
///   callable elsewhere.
#[derive(Debug, Default, Clone)]
struct MemoryState {
    /// Current records keyed by identifier.
    records: BTreeMap<CallableId, StoredCallable>,
    /// Identifiers that have ever carried each scope, with their versions.
    scopes: BTreeMap<ScopeKey, BTreeMap<CallableId, CallableVersion>>,
}

impl MemoryState {
    /// Returns the version count a scope has consumed.
    fn scope_count(&self, key: &ScopeKey) -> u64 {
        let Some(holders) = self.scopes.get(key) else {
            return 0;
        };
        let held = u64::try_from(holders.len()).unwrap_or(u64::MAX);
        let highest = holders.values().map(|version| u64::from(version.get())).max().unwrap_or(0);
        held.max(highest)
    }
}

/// In-memory callable store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCallableStore {
    /// Store contents protected by a mutex.
    state: Arc<Mutex<MemoryState>>,
    /// Gate serializing units of work.
    gate: Arc<TransactionGate>,
}

impl InMemoryCallableStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the store contents.
    fn lock_state(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Store("callable store mutex poisoned".to_string()))
    }
}

impl<T: Callable> CallableStore<T> for InMemoryCallableStore {
    fn find_by_id(&self, id: CallableId) -> Result<Option<T>, StoreError> {
        let _gate = self.gate.enter();
        let record = self.lock_state()?.records.get(&id).cloned();
        match record {
            Some(record) if record.kind == T::KIND => record.decode().map(Some),
            _ => Ok(None),
        }
    }

    fn find_by_name_and_module(&self, name: &str, module: &str) -> Result<Vec<T>, StoreError> {
        let _gate = self.gate.enter();
        let mut records: Vec<StoredCallable> = self
            .lock_state()?
            .records
            .values()
            .filter(|record| record.kind == T::KIND && record.name == name && record.module == module)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.version);
        records.iter().map(StoredCallable::decode).collect()
    }

    fn count_by_name_and_module(&self, name: &str, module: &str) -> Result<u64, StoreError> {
        let _gate = self.gate.enter();
        let key = (T::KIND, name.to_string(), module.to_string());
        Ok(self.lock_state()?.scope_count(&key))
    }

    fn save(&self, entity: T) -> Result<T, StoreError> {
        let _gate = self.gate.enter();
        let record = StoredCallable::encode(&entity)?;
        let mut state = self.lock_state()?;
        if let Some(existing) = state.records.get(&record.id)
            && existing.kind != record.kind
        {
            return Err(StoreError::Invalid(format!(
                "identifier {} already belongs to a {}",
                record.id, existing.kind
            )));
        }
        if state.records.values().any(|other| record.collides_with(other)) {
            return Err(record.version_conflict());
        }
        state
            .scopes
            .entry((record.kind, record.name.clone(), record.module.clone()))
            .or_default()
            .entry(record.id)
            .or_insert(record.version);
        state.records.insert(record.id, record);
        drop(state);
        Ok(entity)
    }
}

impl UnitOfWork for InMemoryCallableStore {
    fn run<R, F>(&self, work: F) -> Result<R, RegistryError>
    where
        F: FnOnce() -> Result<R, RegistryError>,
    {
        let gate = self.gate.enter();
        if !gate.is_outermost() {
            return work();
        }
        let snapshot = self.lock_state()?.clone();
        let mut rollback = Rollback {
            state: &self.state,
            snapshot: Some(snapshot),
        };
        let result = work();
        if result.is_ok() {
            rollback.snapshot = None;
        }
        result
    }
}

/// Restores the store contents unless the unit of work committed.
struct Rollback<'a> {
    /// Contents to restore.
    state: &'a Mutex<MemoryState>,
    /// State captured when the unit of work began; `None` once committed.
    snapshot: Option<MemoryState>,
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.state.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
        }
    }
}
