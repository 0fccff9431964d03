// crates/callable-registry-core/src/runtime/mod.rs
// ============================================================================
// Module: Callable Registry Runtime
// Description: Upsert services, mappers, and the in-memory store.
// Purpose: Implement the registry write path over the store interfaces.
// Dependencies: crate::{audit, core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime components that turn submissions into stored, versioned callables.
//! Stores plug in through [`crate::interfaces`]; the in-memory store here is
//! the reference implementation used by tests.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod gate;
pub mod mapper;
pub mod record;
pub mod registry;
pub mod retry;
pub mod store;
pub mod upsert;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use gate::GateGuard;
pub use gate::TransactionGate;
pub use mapper::FieldMapper;
pub use record::StoredCallable;
pub use registry::CallableRegistry;
pub use retry::RetryPolicy;
pub use retry::retry_on_conflict;
pub use store::InMemoryCallableStore;
pub use upsert::CallableService;
