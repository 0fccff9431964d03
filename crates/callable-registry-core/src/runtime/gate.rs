// crates/callable-registry-core/src/runtime/gate.rs
// ============================================================================
// Module: Transaction Gate
// Description: Thread-reentrant exclusion for store units of work.
// Purpose: Serialize units of work while letting their own store calls proceed.
// Dependencies: parking_lot
// ============================================================================

//! ## Overview
//! Stores hold the gate for every operation. A thread that already owns the
//! gate (because it is inside [`crate::UnitOfWork::run`]) re-enters without
//! waiting; every other thread blocks until the owner releases it. This keeps
//! a unit of work's read-check-write sequence free of interleaved writes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::Cell;

use parking_lot::ReentrantMutex;
use parking_lot::ReentrantMutexGuard;

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Thread-reentrant gate shared by a store's operations.
///
/// # Invariants
/// - The depth cell is only touched while the owning thread holds the lock.
#[derive(Debug, Default)]
pub struct TransactionGate {
    /// Re-entry depth of the owning thread.
    depth: ReentrantMutex<Cell<usize>>,
}

impl TransactionGate {
    /// Creates an unowned gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters the gate, waiting while another thread owns it.
    #[must_use]
    pub fn enter(&self) -> GateGuard<'_> {
        let guard = self.depth.lock();
        let depth = guard.get() + 1;
        guard.set(depth);
        GateGuard {
            guard,
            outermost: depth == 1,
        }
    }
}

/// Scoped ownership of a [`TransactionGate`].
#[derive(Debug)]
pub struct GateGuard<'a> {
    /// Held lock; released on drop after the depth is restored.
    guard: ReentrantMutexGuard<'a, Cell<usize>>,
    /// Whether this guard took ownership rather than re-entering.
    outermost: bool,
}

impl GateGuard<'_> {
    /// Returns true when this guard is not nested inside another on the same thread.
    #[must_use]
    pub const fn is_outermost(&self) -> bool {
        self.outermost
    }
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.guard.set(self.guard.get().saturating_sub(1));
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn gate_is_reentrant_on_the_owning_thread() {
        let gate = TransactionGate::new();
        let outer = gate.enter();
        let inner = gate.enter();
        assert!(outer.is_outermost());
        assert!(!inner.is_outermost());
    }

    #[test]
    fn depth_unwinds_to_a_fresh_outermost_entry() {
        let gate = TransactionGate::new();
        {
            let _outer = gate.enter();
            let _inner = gate.enter();
        }
        assert!(gate.enter().is_outermost());
    }

    #[test]
    fn gate_blocks_other_threads_until_released() {
        let gate = Arc::new(TransactionGate::new());
        let entered = Arc::new(AtomicBool::new(false));
        let guard = gate.enter();
        let handle = {
            let gate = Arc::clone(&gate);
            let entered = Arc::clone(&entered);
            thread::spawn(move || {
                let _guard = gate.enter();
                entered.store(true, Ordering::SeqCst);
            })
        };
        thread::sleep(Duration::from_millis(50));
        assert!(!entered.load(Ordering::SeqCst));
        drop(guard);
        handle.join().unwrap();
        assert!(entered.load(Ordering::SeqCst));
    }
}
