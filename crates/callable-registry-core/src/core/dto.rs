// crates/callable-registry-core/src/core/dto.rs
// ============================================================================
// Module: Callable External Representations
// Description: Submission and response shapes for callable artifacts.
// Purpose: Separate the wire form (optional id, advisory version) from entities.
// Dependencies: crate::core::{callable, identifiers, kinds}, serde, serde_json
// ============================================================================

//! ## Overview
//! DTOs are what callers submit to and receive from the registry. A
//! submission may omit its identifier; the registry response always carries
//! the stored identifier and version. Any `version` present on a submission
//! is ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::callable::FunctionArgument;
use crate::core::identifiers::CallableId;
use crate::core::kinds::DatasetProcessType;

// ============================================================================
// SECTION: DTO Contract
// ============================================================================

/// Accessors the upsert runtime needs from any submission.
pub trait CallableDto {
    /// Returns the shared header fields.
    fn header(&self) -> &CallableHeaderDto;

    /// Returns the submitted identifier, if any.
    fn id(&self) -> Option<CallableId> {
        self.header().uuid
    }
}

// ============================================================================
// SECTION: DTO Types
// ============================================================================

/// Header fields shared by every callable DTO.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallableHeaderDto {
    /// Stable identifier; absent on first submission.
    #[serde(default)]
    pub uuid: Option<CallableId>,
    /// Human-chosen label.
    pub name: String,
    /// Logical namespace.
    #[serde(default)]
    pub module: String,
    /// Stored version; populated on responses only.
    #[serde(default)]
    pub version: Option<u32>,
    /// Optional display label.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Callable docstring.
    #[serde(default)]
    pub doc: Option<String>,
    /// Docstring of the enclosing module.
    #[serde(default)]
    pub module_doc: Option<String>,
    /// Source code.
    #[serde(default)]
    pub code: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Declared arguments.
    #[serde(default)]
    pub args: Vec<FunctionArgument>,
}

impl CallableHeaderDto {
    /// Creates a submission header with no identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            ..Self::default()
        }
    }
}

/// External form of a slicing function.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceFunctionDto {
    /// Shared header fields.
    #[serde(flatten)]
    pub header: CallableHeaderDto,
    /// Whether the function is applied per cell.
    #[serde(default)]
    pub cell_level: bool,
    /// Column type for cell-level functions.
    #[serde(default)]
    pub column_type: Option<String>,
    /// How the function is expressed.
    #[serde(default)]
    pub process_type: DatasetProcessType,
    /// Declarative clauses.
    #[serde(default)]
    pub clauses: Vec<Value>,
}

impl CallableDto for SliceFunctionDto {
    fn header(&self) -> &CallableHeaderDto {
        &self.header
    }
}

/// External form of a transformation function.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationFunctionDto {
    /// Shared header fields.
    #[serde(flatten)]
    pub header: CallableHeaderDto,
    /// Whether the function is applied per cell.
    #[serde(default)]
    pub cell_level: bool,
    /// Column type for cell-level functions.
    #[serde(default)]
    pub column_type: Option<String>,
    /// How the function is expressed.
    #[serde(default)]
    pub process_type: DatasetProcessType,
}

impl CallableDto for TransformationFunctionDto {
    fn header(&self) -> &CallableHeaderDto {
        &self.header
    }
}

/// External form of a test function.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFunctionDto {
    /// Shared header fields.
    #[serde(flatten)]
    pub header: CallableHeaderDto,
    /// Template describing failures for debugging.
    #[serde(default)]
    pub debug_description: Option<String>,
}

impl CallableDto for TestFunctionDto {
    fn header(&self) -> &CallableHeaderDto {
        &self.header
    }
}
