// crates/callable-registry-core/src/lib.rs
// ============================================================================
// Module: Callable Registry Core Library
// Description: Public API surface for the callable registry core.
// Purpose: Expose callable types, store interfaces, and the upsert runtime.
// Dependencies: crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The callable registry stores named, module-scoped units of executable
//! logic (slicing, transformation, and test functions). Each artifact is
//! addressed by a stable identifier and carries a version that increases per
//! (kind, name, module) pair. Persistence is backend-agnostic and plugs in
//! through [`CallableStore`] and [`UnitOfWork`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RegistryAuditEvent;
pub use audit::RegistryAuditSink;
pub use audit::SaveAction;
pub use audit::StderrAuditSink;
pub use interfaces::CallableMapper;
pub use interfaces::CallableStore;
pub use interfaces::RegistryError;
pub use interfaces::StoreError;
pub use interfaces::UnitOfWork;
pub use runtime::CallableRegistry;
pub use runtime::CallableService;
pub use runtime::FieldMapper;
pub use runtime::InMemoryCallableStore;
pub use runtime::RetryPolicy;
pub use runtime::StoredCallable;
pub use runtime::TransactionGate;
pub use runtime::retry_on_conflict;
