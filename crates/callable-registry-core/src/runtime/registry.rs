// crates/callable-registry-core/src/runtime/registry.rs
// ============================================================================
// Module: Callable Registry
// Description: One upsert service per built-in callable kind over a shared store.
// Purpose: Offer a single entry point for slicing, transformation, and test functions.
// Dependencies: crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`CallableRegistry`] wires the three built-in callable kinds to one shared
//! store and audit sink. Each kind keeps its own version scopes; a slicing
//! function and a test function with the same (name, module) never share a
//! counter.

use std::sync::Arc;

use crate::audit::NoopAuditSink;
use crate::audit::RegistryAuditSink;
use crate::core::SliceFunction;
use crate::core::TestFunction;
use crate::core::TransformationFunction;
use crate::interfaces::CallableStore;
use crate::interfaces::StoreError;
use crate::interfaces::UnitOfWork;
use crate::runtime::mapper::FieldMapper;
use crate::runtime::upsert::CallableService;

/// Service serving one kind over a shared store.
type KindService<T, S> = CallableService<T, Arc<S>, FieldMapper>;

/// Registry of upsert services for every built-in callable kind.
pub struct CallableRegistry<S> {
    /// Shared backing store.
    store: Arc<S>,
    /// Slicing function service.
    slice_functions: KindService<SliceFunction, S>,
    /// Transformation function service.
    transformation_functions: KindService<TransformationFunction, S>,
    /// Test function service.
    test_functions: KindService<TestFunction, S>,
}

impl<S> CallableRegistry<S>
where
    S: CallableStore<SliceFunction>
        + CallableStore<TransformationFunction>
        + CallableStore<TestFunction>
        + UnitOfWork,
{
    /// Builds a registry over `store`, reporting writes to `audit`.
    #[must_use]
    pub fn new(store: Arc<S>, audit: Arc<dyn RegistryAuditSink>) -> Self {
        Self {
            slice_functions: CallableService::new(Arc::clone(&store), FieldMapper, Arc::clone(&audit)),
            transformation_functions: CallableService::new(
                Arc::clone(&store),
                FieldMapper,
                Arc::clone(&audit),
            ),
            test_functions: CallableService::new(Arc::clone(&store), FieldMapper, audit),
            store,
        }
    }

    /// Builds a registry that discards audit events.
    #[must_use]
    pub fn without_audit(store: Arc<S>) -> Self {
        Self::new(store, Arc::new(NoopAuditSink))
    }

    /// Returns the shared store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the slicing function service.
    #[must_use]
    pub const fn slice_functions(&self) -> &KindService<SliceFunction, S> {
        &self.slice_functions
    }

    /// Returns the transformation function service.
    #[must_use]
    pub const fn transformation_functions(&self) -> &KindService<TransformationFunction, S> {
        &self.transformation_functions
    }

    /// Returns the test function service.
    #[must_use]
    pub const fn test_functions(&self) -> &KindService<TestFunction, S> {
        &self.test_functions
    }

    /// Checks that the backing store can serve requests.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is not ready.
    pub fn readiness(&self) -> Result<(), StoreError> {
        CallableStore::<SliceFunction>::readiness(self.store.as_ref())
    }
}
