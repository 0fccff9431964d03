// crates/callable-registry-core/src/runtime/upsert.rs
// ============================================================================
// Module: Callable Upsert Service
// Description: Create-or-update orchestration with scoped version assignment.
// Purpose: Implement the registry write path once for every callable kind.
// Dependencies: crate::{audit, core, interfaces}
// ============================================================================

//! ## Overview
//! [`CallableService`] resolves a submission's identifier inside one unit of
//! work. A known identifier is updated in place, keeping its identifier and
//! version. Anything else becomes a new callable whose version is the number
//! of callables that have ever carried its (name, module) pair plus one.
//!
//! The version is derived from the store's scope count, not from the highest
//! live version. Stores count from an append-only ledger, so an update that
//! renames a callable out of a pair does not free its version there. A store
//! that starts deleting callables must revisit this rule.
//!
//! The service never retries. A [`StoreError::VersionConflict`] from a
//! concurrent creator reaches the caller unchanged; see
//! [`crate::runtime::retry_on_conflict`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::marker::PhantomData;
use std::sync::Arc;

use crate::audit::RegistryAuditEvent;
use crate::audit::RegistryAuditSink;
use crate::audit::SaveAction;
use crate::core::Callable;
use crate::core::CallableDto;
use crate::core::CallableId;
use crate::core::CallableVersion;
use crate::interfaces::CallableMapper;
use crate::interfaces::CallableStore;
use crate::interfaces::RegistryError;
use crate::interfaces::StoreError;
use crate::interfaces::UnitOfWork;

// ============================================================================
// SECTION: Service
// ============================================================================

/// Generic upsert service for one callable kind.
///
/// # Invariants
/// - Every `save` performs exactly one store write inside one unit of work.
/// - Updates never change an identifier or a version.
pub struct CallableService<T, S, M> {
    /// Backing store.
    store: S,
    /// Entity/DTO mapper.
    mapper: M,
    /// Audit sink for write outcomes.
    audit: Arc<dyn RegistryAuditSink>,
    /// Callable kind served.
    kind: PhantomData<fn() -> T>,
}

impl<T, S, M> CallableService<T, S, M>
where
    T: Callable,
    S: CallableStore<T> + UnitOfWork,
    M: CallableMapper<T>,
{
    /// Creates a service over a store and mapper.
    #[must_use]
    pub fn new(store: S, mapper: M, audit: Arc<dyn RegistryAuditSink>) -> Self {
        Self {
            store,
            mapper,
            audit,
            kind: PhantomData,
        }
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Creates or updates a callable and returns its stored form.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Invalid`] for a blank name, and
    /// [`RegistryError::Store`] (including version conflicts) when the store
    /// rejects the read or the write.
    pub fn save(&self, dto: M::Dto) -> Result<M::Dto, RegistryError> {
        let header = dto.header();
        if header.name.trim().is_empty() {
            return Err(RegistryError::Invalid("name must be non-empty".to_string()));
        }
        let submitted_id = dto.id();
        let name = header.name.clone();
        let module = header.module.clone();

        match self.store.run(|| self.upsert(dto)) {
            Ok((stored, action)) => {
                self.audit.record(&RegistryAuditEvent::saved(
                    T::KIND,
                    stored.id(),
                    stored.name(),
                    stored.module(),
                    stored.version().get(),
                    action,
                ));
                Ok(self.mapper.to_dto(&stored))
            }
            Err(err) => {
                if let RegistryError::Store(StoreError::VersionConflict {
                    version, ..
                }) = &err
                {
                    self.audit.record(&RegistryAuditEvent::conflict(
                        T::KIND,
                        submitted_id,
                        &name,
                        &module,
                        Some(version.get()),
                        err.to_string(),
                    ));
                }
                Err(err)
            }
        }
    }

    /// Loads a callable that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when `id` is unknown.
    pub fn get(&self, id: CallableId) -> Result<M::Dto, RegistryError> {
        let entity = self.store.get_by_id(id)?;
        Ok(self.mapper.to_dto(&entity))
    }

    /// Loads a callable if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the lookup fails.
    pub fn find(&self, id: CallableId) -> Result<Option<M::Dto>, RegistryError> {
        let entity = self.store.find_by_id(id)?;
        Ok(entity.map(|entity| self.mapper.to_dto(&entity)))
    }

    /// Lists every version of a (name, module) pair, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the query fails.
    pub fn history(&self, name: &str, module: &str) -> Result<Vec<M::Dto>, RegistryError> {
        let entities = self.store.find_by_name_and_module(name, module)?;
        Ok(entities.iter().map(|entity| self.mapper.to_dto(entity)).collect())
    }

    /// Resolves create-vs-update and writes the result; runs inside a unit of work.
    fn upsert(&self, dto: M::Dto) -> Result<(T, SaveAction), RegistryError> {
        let existing = match dto.id() {
            Some(id) => self.store.find_by_id(id)?,
            None => None,
        };
        let (entity, action) = match existing {
            Some(mut entity) => {
                self.mapper.merge(&mut entity, dto);
                (entity, SaveAction::Updated)
            }
            None => (self.create(dto)?, SaveAction::Created),
        };
        let stored = self.store.save(entity)?;
        Ok((stored, action))
    }

    /// Materializes a new entity and stamps its scoped version.
    fn create(&self, dto: M::Dto) -> Result<T, RegistryError> {
        let id = dto.id().unwrap_or_else(CallableId::random);
        let mut entity = self.mapper.to_entity(dto, id);
        let count = self.store.count_by_name_and_module(entity.name(), entity.module())?;
        let version = CallableVersion::after_count(count).ok_or_else(|| {
            RegistryError::Invalid(format!(
                "version space exhausted for {}:{}",
                entity.module(),
                entity.name()
            ))
        })?;
        entity.header_mut().assign_version(version);
        Ok(entity)
    }
}
