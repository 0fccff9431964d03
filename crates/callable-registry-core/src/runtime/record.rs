// crates/callable-registry-core/src/runtime/record.rs
// ============================================================================
// Module: Stored Callable Records
// Description: Kind-erased storage form of a callable.
// Purpose: Let one table or map hold every callable kind with indexed columns.
// Dependencies: crate::core, crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! A [`StoredCallable`] pairs the indexed columns (kind, id, name, module,
//! version) with the full JSON payload. Decoding fails closed when the payload
//! disagrees with its columns.

use serde_json::Value;

use crate::core::Callable;
use crate::core::CallableId;
use crate::core::CallableKind;
use crate::core::CallableVersion;
use crate::interfaces::StoreError;

/// Kind-erased callable record.
///
/// # Invariants
/// - Column values equal the corresponding fields inside `payload`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCallable {
    /// Callable kind.
    pub kind: CallableKind,
    /// Stable identifier.
    pub id: CallableId,
    /// Callable name.
    pub name: String,
    /// Callable module.
    pub module: String,
    /// Assigned version.
    pub version: CallableVersion,
    /// Full serialized entity.
    pub payload: Value,
}

impl StoredCallable {
    /// Encodes an entity into its storage form.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when the entity cannot be serialized.
    pub fn encode<T: Callable>(entity: &T) -> Result<Self, StoreError> {
        let payload =
            serde_json::to_value(entity).map_err(|err| StoreError::Invalid(err.to_string()))?;
        Ok(Self {
            kind: T::KIND,
            id: entity.id(),
            name: entity.name().to_string(),
            module: entity.module().to_string(),
            version: entity.version(),
            payload,
        })
    }

    /// Decodes the payload back into an entity of kind `T`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when the kind, payload, or columns disagree.
    pub fn decode<T: Callable>(&self) -> Result<T, StoreError> {
        if self.kind != T::KIND {
            return Err(StoreError::Corrupt(format!(
                "record {} is a {}, expected {}",
                self.id,
                self.kind,
                T::KIND
            )));
        }
        let entity: T = serde_json::from_value(self.payload.clone())
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        if entity.id() != self.id
            || entity.name() != self.name
            || entity.module() != self.module
            || entity.version() != self.version
        {
            return Err(StoreError::Corrupt(format!(
                "record {} payload does not match indexed columns",
                self.id
            )));
        }
        Ok(entity)
    }

    /// Returns true when `other` is a different callable in the same version scope.
    #[must_use]
    pub fn collides_with(&self, other: &Self) -> bool {
        self.id != other.id
            && self.kind == other.kind
            && self.version == other.version
            && self.name == other.name
            && self.module == other.module
    }

    /// Builds the conflict error for this record's scope and version.
    #[must_use]
    pub fn version_conflict(&self) -> StoreError {
        StoreError::VersionConflict {
            kind: self.kind,
            name: self.name.clone(),
            module: self.module.clone(),
            version: self.version,
        }
    }
}
