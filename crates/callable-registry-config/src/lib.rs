// crates/callable-registry-config/src/lib.rs
// ============================================================================
// Module: Callable Registry Config Library
// Description: Canonical config model, validation, and registry wiring.
// Purpose: Single source of truth for callable-registry.toml semantics.
// Dependencies: callable-registry-core, callable-registry-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `callable-registry-config` defines the configuration model for the callable
//! registry. It provides strict, fail-closed validation and builds a ready
//! [`callable_registry_core::CallableRegistry`] from a validated config.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use store::ConfiguredStore;
pub use store::build_registry;
