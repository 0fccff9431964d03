// crates/callable-registry-core/src/core/identifiers.rs
// ============================================================================
// Module: Callable Identifiers
// Description: Stable identifiers and version numbers for callable artifacts.
// Purpose: Provide strongly typed, serializable identity with stable wire forms.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! A callable is addressed by a [`CallableId`] that is assigned once and never
//! changes. Its [`CallableVersion`] is informational, 1-based, and unique only
//! within the (kind, name, module) scope it was assigned in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Process-wide unique identifier for a callable artifact.
///
/// # Invariants
/// - Established exactly once, when the artifact is first created.
/// - Serializes as the canonical hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallableId(Uuid);

impl CallableId {
    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Mints a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CallableId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

impl From<Uuid> for CallableId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Version number of a callable within its (kind, name, module) scope.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based).
/// - New versions are derived from a store count via [`CallableVersion::after_count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallableVersion(NonZeroU32);

impl CallableVersion {
    /// The first version assigned within a scope.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Returns the version that follows `count` previously created artifacts.
    ///
    /// Returns `None` when the next version does not fit in a `u32`.
    #[must_use]
    pub fn after_count(count: u64) -> Option<Self> {
        let next = count.checked_add(1)?;
        u32::try_from(next).ok().and_then(NonZeroU32::new).map(Self)
    }

    /// Creates a version from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Returns the raw version value (always >= 1).
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for CallableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use super::*;

    #[test]
    fn version_after_count_is_one_based() {
        assert_eq!(CallableVersion::after_count(0), Some(CallableVersion::FIRST));
        assert_eq!(CallableVersion::after_count(41).map(CallableVersion::get), Some(42));
    }

    #[test]
    fn version_after_count_rejects_overflow() {
        assert!(CallableVersion::after_count(u64::from(u32::MAX)).is_none());
        assert!(CallableVersion::after_count(u64::MAX).is_none());
    }

    #[test]
    fn callable_id_parses_and_displays_hyphenated() {
        let raw = "7c9e6679-7425-40de-944b-e07fc1f90ae7";
        let id: CallableId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
        assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{raw}\""));
    }
}
