// crates/callable-registry-config/src/store.rs
// ============================================================================
// Module: Configured Callable Store
// Description: Store backend selected at runtime from configuration.
// Purpose: Wire a validated config into a ready callable registry.
// Dependencies: callable-registry-core, callable-registry-store-sqlite
// ============================================================================

//! ## Overview
//! The store traits carry generic methods, so backends are selected with an
//! enum rather than a trait object. [`ConfiguredStore`] forwards every
//! [`CallableStore`] and [`UnitOfWork`] call to the selected backend.

use std::sync::Arc;

use callable_registry_core::Callable;
use callable_registry_core::CallableId;
use callable_registry_core::CallableRegistry;
use callable_registry_core::CallableStore;
use callable_registry_core::InMemoryCallableStore;
use callable_registry_core::RegistryError;
use callable_registry_core::StoreError;
use callable_registry_core::UnitOfWork;
use callable_registry_store_sqlite::SqliteCallableStore;

use crate::config::ConfigError;
use crate::config::RegistryConfig;
use crate::config::StoreConfig;
use crate::config::StoreType;

/// Callable store backend chosen by configuration.
#[derive(Clone)]
pub enum ConfiguredStore {
    /// In-memory store.
    Memory(InMemoryCallableStore),
    /// `SQLite`-backed durable store.
    Sqlite(SqliteCallableStore),
}

impl ConfiguredStore {
    /// Opens the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a sqlite store has no path and
    /// [`ConfigError::Init`] when the database cannot be opened.
    pub fn open(config: &StoreConfig) -> Result<Self, ConfigError> {
        match config.store_type {
            StoreType::Memory => Ok(Self::Memory(InMemoryCallableStore::new())),
            StoreType::Sqlite => {
                let sqlite_config = config.sqlite_config().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                let store = SqliteCallableStore::new(sqlite_config)
                    .map_err(|err| ConfigError::Init(err.to_string()))?;
                Ok(Self::Sqlite(store))
            }
        }
    }
}

impl<T: Callable> CallableStore<T> for ConfiguredStore {
    fn find_by_id(&self, id: CallableId) -> Result<Option<T>, StoreError> {
        match self {
            Self::Memory(store) => store.find_by_id(id),
            Self::Sqlite(store) => store.find_by_id(id),
        }
    }

    fn find_by_name_and_module(&self, name: &str, module: &str) -> Result<Vec<T>, StoreError> {
        match self {
            Self::Memory(store) => store.find_by_name_and_module(name, module),
            Self::Sqlite(store) => store.find_by_name_and_module(name, module),
        }
    }

    fn count_by_name_and_module(&self, name: &str, module: &str) -> Result<u64, StoreError> {
        match self {
            Self::Memory(store) => CallableStore::<T>::count_by_name_and_module(store, name, module),
            Self::Sqlite(store) => CallableStore::<T>::count_by_name_and_module(store, name, module),
        }
    }

    fn save(&self, entity: T) -> Result<T, StoreError> {
        match self {
            Self::Memory(store) => store.save(entity),
            Self::Sqlite(store) => store.save(entity),
        }
    }

    fn readiness(&self) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => CallableStore::<T>::readiness(store),
            Self::Sqlite(store) => CallableStore::<T>::readiness(store),
        }
    }
}

impl UnitOfWork for ConfiguredStore {
    fn run<R, F>(&self, work: F) -> Result<R, RegistryError>
    where
        F: FnOnce() -> Result<R, RegistryError>,
    {
        match self {
            Self::Memory(store) => store.run(work),
            Self::Sqlite(store) => store.run(work),
        }
    }
}

/// Builds a callable registry from a validated configuration.
///
/// # Errors
///
/// Returns [`ConfigError`] when validation fails or a configured component
/// cannot be opened.
pub fn build_registry(config: &RegistryConfig) -> Result<CallableRegistry<ConfiguredStore>, ConfigError> {
    config.validate()?;
    let store = ConfiguredStore::open(&config.store)?;
    let audit = config.audit.build_sink()?;
    Ok(CallableRegistry::new(Arc::new(store), audit))
}
