// crates/callable-registry-core/src/interfaces/mod.rs
// ============================================================================
// Module: Callable Registry Interfaces
// Description: Backend-agnostic interfaces for callable storage and mapping.
// Purpose: Define the contract surfaces used by the upsert runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the registry integrates with persistence and with
//! external representations without embedding backend-specific details.
//! Any engine exposing [`CallableStore`] and [`UnitOfWork`] can back the
//! registry: a relational table, a document store, or an in-memory map.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::Callable;
use crate::core::CallableDto;
use crate::core::CallableId;
use crate::core::CallableKind;
use crate::core::CallableVersion;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Callable store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Absence of a record is never a `StoreError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("callable store io error: {0}")]
    Io(String),
    /// Stored data is corrupted or fails integrity checks.
    #[error("callable store corruption: {0}")]
    Corrupt(String),
    /// Store data or request is invalid.
    #[error("callable store invalid data: {0}")]
    Invalid(String),
    /// A write would give two live callables the same version in one scope.
    #[error("callable store version conflict: {kind} {module}:{name} version {version}")]
    VersionConflict {
        /// Callable kind.
        kind: CallableKind,
        /// Callable name.
        name: String,
        /// Callable module.
        module: String,
        /// Version already taken in the scope.
        version: CallableVersion,
    },
    /// Store reported an error.
    #[error("callable store error: {0}")]
    Store(String),
}

/// Registry errors surfaced to callers of the upsert runtime.
///
/// # Invariants
/// - `NotFound` is produced only by direct lookups, never by `save`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No callable of `kind` has identifier `id`.
    #[error("{kind} not found with id {id}")]
    NotFound {
        /// Callable kind that was looked up.
        kind: CallableKind,
        /// Identifier that was looked up.
        id: CallableId,
    },
    /// Submission rejected before reaching the store.
    #[error("invalid callable submission: {0}")]
    Invalid(String),
    /// Underlying store failure, including version conflicts.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Returns true when the error is a store-reported version conflict.
    #[must_use]
    pub const fn is_version_conflict(&self) -> bool {
        matches!(self, Self::Store(StoreError::VersionConflict { .. }))
    }
}

// ============================================================================
// SECTION: Callable Store
// ============================================================================

/// Persistence contract for one callable kind.
///
/// # Invariants
/// - `save` rejects a (kind, name, module, version) triple already held by a
///   different identifier with [`StoreError::VersionConflict`].
/// - `count_by_name_and_module` counts every artifact that has ever carried
///   the pair, including artifacts since renamed away, and never reports less
///   than the highest version the pair has held. A create stamped with
///   `count + 1` therefore never reuses a version still held in the pair.
pub trait CallableStore<T: Callable> {
    /// Loads a callable by identifier; absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup itself fails.
    fn find_by_id(&self, id: CallableId) -> Result<Option<T>, StoreError>;

    /// Loads a callable that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when no callable has `id`, or
    /// [`RegistryError::Store`] when the lookup fails.
    fn get_by_id(&self, id: CallableId) -> Result<T, RegistryError> {
        self.find_by_id(id)?.ok_or(RegistryError::NotFound {
            kind: T::KIND,
            id,
        })
    }

    /// Lists every version of a (name, module) pair in ascending version order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn find_by_name_and_module(&self, name: &str, module: &str) -> Result<Vec<T>, StoreError>;

    /// Counts artifacts that have ever carried the (name, module) pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn count_by_name_and_module(&self, name: &str, module: &str) -> Result<u64, StoreError>;

    /// Persists a new or updated callable and returns the stored form.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] on a duplicate scope version and
    /// other [`StoreError`] variants when the write fails.
    fn save(&self, entity: T) -> Result<T, StoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Transaction scope wrapping one read-check-write sequence.
pub trait UnitOfWork {
    /// Runs `work` inside a single transaction.
    ///
    /// Commits when `work` returns `Ok`; rolls back when it returns `Err` or
    /// unwinds. Nested calls on the same thread join the outer scope.
    ///
    /// # Errors
    ///
    /// Returns the error from `work`, or a [`StoreError`] when the
    /// transaction cannot be opened or committed.
    fn run<R, F>(&self, work: F) -> Result<R, RegistryError>
    where
        F: FnOnce() -> Result<R, RegistryError>;
}

impl<T: Callable, S: CallableStore<T>> CallableStore<T> for Arc<S> {
    fn find_by_id(&self, id: CallableId) -> Result<Option<T>, StoreError> {
        self.as_ref().find_by_id(id)
    }

    fn find_by_name_and_module(&self, name: &str, module: &str) -> Result<Vec<T>, StoreError> {
        self.as_ref().find_by_name_and_module(name, module)
    }

    fn count_by_name_and_module(&self, name: &str, module: &str) -> Result<u64, StoreError> {
        self.as_ref().count_by_name_and_module(name, module)
    }

    fn save(&self, entity: T) -> Result<T, StoreError> {
        self.as_ref().save(entity)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.as_ref().readiness()
    }
}

impl<S: UnitOfWork> UnitOfWork for Arc<S> {
    fn run<R, F>(&self, work: F) -> Result<R, RegistryError>
    where
        F: FnOnce() -> Result<R, RegistryError>,
    {
        self.as_ref().run(work)
    }
}

// ============================================================================
// SECTION: Mapping
// ============================================================================

/// Bidirectional mapping between a callable kind and its external form.
///
/// # Invariants
/// - `merge` never alters the identifier or version of `existing`.
pub trait CallableMapper<T: Callable> {
    /// External representation for the kind.
    type Dto: CallableDto;

    /// Materializes a new entity carrying identifier `id`.
    fn to_entity(&self, dto: Self::Dto, id: CallableId) -> T;

    /// Copies the submission's mutable fields onto an existing entity.
    fn merge(&self, existing: &mut T, dto: Self::Dto);

    /// Renders a stored entity to its external form.
    fn to_dto(&self, entity: &T) -> Self::Dto;
}
