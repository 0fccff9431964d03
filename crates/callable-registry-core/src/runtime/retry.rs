// crates/callable-registry-core/src/runtime/retry.rs
// ============================================================================
// Module: Conflict Retry
// Description: Caller-side retry of whole upserts on version conflicts.
// Purpose: Give callers an explicit, bounded way to resolve creation races.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! A version conflict means another writer created a callable in the same
//! scope between this writer's count and its insert. Re-running the whole
//! upsert re-reads the count. The upsert service itself never does this; the
//! caller opts in by wrapping its call in [`retry_on_conflict`].

use std::num::NonZeroU32;

use crate::interfaces::RegistryError;

/// Default number of attempts for [`RetryPolicy::default`].
const DEFAULT_MAX_ATTEMPTS: NonZeroU32 = match NonZeroU32::new(3) {
    Some(attempts) => attempts,
    None => NonZeroU32::MIN,
};

/// Bounded retry policy for version conflicts.
///
/// # Invariants
/// - `max_attempts` counts the first attempt; 1 disables retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed.
    max_attempts: NonZeroU32,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_attempts` total attempts.
    #[must_use]
    pub const fn new(max_attempts: NonZeroU32) -> Self {
        Self {
            max_attempts,
        }
    }

    /// Policy that runs the operation once and never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::new(NonZeroU32::MIN)
    }

    /// Returns the total number of attempts allowed.
    #[must_use]
    pub const fn max_attempts(self) -> u32 {
        self.max_attempts.get()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Runs `op`, re-running it while it fails with a version conflict.
///
/// # Errors
///
/// Returns the first non-conflict error, or the last conflict once the policy
/// is exhausted.
pub fn retry_on_conflict<R, F>(policy: RetryPolicy, mut op: F) -> Result<R, RegistryError>
where
    F: FnMut() -> Result<R, RegistryError>,
{
    let mut attempt = 1;
    loop {
        match op() {
            Err(err) if err.is_version_conflict() && attempt < policy.max_attempts() => {
                attempt += 1;
            }
            outcome => return outcome,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
