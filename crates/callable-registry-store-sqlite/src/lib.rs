// crates/callable-registry-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Callable Store
// Description: Durable CallableStore backend using SQLite.
// Purpose: Provide production persistence for the callable registry.
// Dependencies: callable-registry-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`CallableStore`] and [`UnitOfWork`]
//! for every callable kind. One table holds all kinds; a unique
//! (kind, name, module, version) constraint turns racing creators into
//! version conflicts. Stored payloads are hashed and verified on every read.
//!
//! [`CallableStore`]: callable_registry_core::CallableStore
//! [`UnitOfWork`]: callable_registry_core::UnitOfWork

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_PAYLOAD_BYTES;
pub use store::SqliteCallableStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
