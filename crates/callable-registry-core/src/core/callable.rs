// crates/callable-registry-core/src/core/callable.rs
// ============================================================================
// Module: Callable Contract
// Description: Shared identity, version, and header payload for callable kinds.
// Purpose: Let one generic registry serve every callable kind by composition.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Every callable kind embeds a [`CallableHeader`] and implements [`Callable`]
//! to expose it. The header owns the identity (`id`) and the assigned
//! `version`; both are private so that payload merges cannot rewrite them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::identifiers::CallableId;
use crate::core::identifiers::CallableVersion;

// ============================================================================
// SECTION: Kinds
// ============================================================================

/// Discriminator for the callable kinds managed by the registry.
///
/// # Invariants
/// - Labels returned by [`CallableKind::as_str`] are stable storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallableKind {
    /// Dataset slicing function.
    SliceFunction,
    /// Dataset transformation function.
    TransformationFunction,
    /// Test function.
    TestFunction,
}

impl CallableKind {
    /// Returns the stable storage label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SliceFunction => "slice_function",
            Self::TransformationFunction => "transformation_function",
            Self::TestFunction => "test_function",
        }
    }

    /// Parses a storage label back into a kind.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "slice_function" => Some(Self::SliceFunction),
            "transformation_function" => Some(Self::TransformationFunction),
            "test_function" => Some(Self::TestFunction),
            _ => None,
        }
    }
}

impl fmt::Display for CallableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Header
// ============================================================================

/// Declared argument of a callable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionArgument {
    /// Argument name.
    pub name: String,
    /// Declared argument type label.
    #[serde(rename = "type")]
    pub arg_type: String,
    /// Whether the argument may be omitted.
    #[serde(default)]
    pub optional: bool,
    /// Default value rendered as source text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Position of the argument in the signature.
    pub arg_order: u32,
}

/// Fields shared by every callable kind.
///
/// # Invariants
/// - `id` never changes after construction.
/// - `version` is only replaced by the upsert runtime, from a store count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallableHeader {
    /// Stable identifier.
    id: CallableId,
    /// Version within the (kind, name, module) scope.
    version: CallableVersion,
    /// Human-chosen label.
    pub name: String,
    /// Logical namespace; empty for top-level callables.
    pub module: String,
    /// Optional label shown to users instead of `name`.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Callable docstring.
    #[serde(default)]
    pub doc: Option<String>,
    /// Docstring of the enclosing module.
    #[serde(default)]
    pub module_doc: Option<String>,
    /// Source code of the callable.
    #[serde(default)]
    pub code: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Declared arguments.
    #[serde(default)]
    pub args: Vec<FunctionArgument>,
}

impl CallableHeader {
    /// Creates a header at [`CallableVersion::FIRST`] with an empty payload.
    #[must_use]
    pub fn new(id: CallableId, name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            id,
            version: CallableVersion::FIRST,
            name: name.into(),
            module: module.into(),
            display_name: None,
            doc: None,
            module_doc: None,
            code: String::new(),
            tags: Vec::new(),
            args: Vec::new(),
        }
    }

    /// Returns the header with an explicit version, for stores and replay tooling.
    #[must_use]
    pub fn with_version(mut self, version: CallableVersion) -> Self {
        self.version = version;
        self
    }

    /// Returns the stable identifier.
    #[must_use]
    pub const fn id(&self) -> CallableId {
        self.id
    }

    /// Returns the assigned version.
    #[must_use]
    pub const fn version(&self) -> CallableVersion {
        self.version
    }

    /// Stamps a freshly computed version onto a not-yet-persisted header.
    pub(crate) const fn assign_version(&mut self, version: CallableVersion) {
        self.version = version;
    }
}

// ============================================================================
// SECTION: Callable Contract
// ============================================================================

/// Contract implemented by every callable kind.
///
/// # Invariants
/// - `KIND` is unique per implementing type.
/// - Implementations expose the same header through both accessors.
pub trait Callable: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Kind discriminator for the implementing type.
    const KIND: CallableKind;

    /// Returns the shared header.
    fn header(&self) -> &CallableHeader;

    /// Returns the shared header for payload updates.
    fn header_mut(&mut self) -> &mut CallableHeader;

    /// Returns the stable identifier.
    fn id(&self) -> CallableId {
        self.header().id()
    }

    /// Returns the callable name.
    fn name(&self) -> &str {
        &self.header().name
    }

    /// Returns the callable module.
    fn module(&self) -> &str {
        &self.header().module
    }

    /// Returns the assigned version.
    fn version(&self) -> CallableVersion {
        self.header().version()
    }
}
