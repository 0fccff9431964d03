// crates/callable-registry-core/src/core/kinds.rs
// ============================================================================
// Module: Callable Kinds
// Description: Concrete callable entities stored by the registry.
// Purpose: Compose the shared header with kind-specific payload.
// Dependencies: crate::core::callable, serde, serde_json
// ============================================================================

//! ## Overview
//! Slicing and transformation functions operate on datasets and share the
//! dataset-processing payload; test functions carry only their header plus a
//! debug description. Kind payloads are opaque to the registry.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::callable::Callable;
use crate::core::callable::CallableHeader;
use crate::core::callable::CallableKind;

/// How a dataset-processing function is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetProcessType {
    /// Arbitrary code body.
    #[default]
    Code,
    /// Declarative clause list.
    Clauses,
}

/// Function selecting a subset of dataset rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceFunction {
    /// Shared callable header.
    pub header: CallableHeader,
    /// Whether the function is applied per cell rather than per row.
    #[serde(default)]
    pub cell_level: bool,
    /// Column type the cell-level function accepts.
    #[serde(default)]
    pub column_type: Option<String>,
    /// How the function is expressed.
    #[serde(default)]
    pub process_type: DatasetProcessType,
    /// Declarative clauses when `process_type` is [`DatasetProcessType::Clauses`].
    #[serde(default)]
    pub clauses: Vec<Value>,
}

impl SliceFunction {
    /// Creates a code-based slicing function around a header.
    #[must_use]
    pub const fn new(header: CallableHeader) -> Self {
        Self {
            header,
            cell_level: false,
            column_type: None,
            process_type: DatasetProcessType::Code,
            clauses: Vec::new(),
        }
    }
}

impl Callable for SliceFunction {
    const KIND: CallableKind = CallableKind::SliceFunction;

    fn header(&self) -> &CallableHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut CallableHeader {
        &mut self.header
    }
}

/// Function rewriting dataset rows or cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationFunction {
    /// Shared callable header.
    pub header: CallableHeader,
    /// Whether the function is applied per cell rather than per row.
    #[serde(default)]
    pub cell_level: bool,
    /// Column type the cell-level function accepts.
    #[serde(default)]
    pub column_type: Option<String>,
    /// How the function is expressed.
    #[serde(default)]
    pub process_type: DatasetProcessType,
}

impl TransformationFunction {
    /// Creates a code-based transformation function around a header.
    #[must_use]
    pub const fn new(header: CallableHeader) -> Self {
        Self {
            header,
            cell_level: false,
            column_type: None,
            process_type: DatasetProcessType::Code,
        }
    }
}

impl Callable for TransformationFunction {
    const KIND: CallableKind = CallableKind::TransformationFunction;

    fn header(&self) -> &CallableHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut CallableHeader {
        &mut self.header
    }
}

/// Test function executed against models and datasets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFunction {
    /// Shared callable header.
    pub header: CallableHeader,
    /// Template describing failures for debugging.
    #[serde(default)]
    pub debug_description: Option<String>,
}

impl TestFunction {
    /// Creates a test function around a header.
    #[must_use]
    pub const fn new(header: CallableHeader) -> Self {
        Self {
            header,
            debug_description: None,
        }
    }
}

impl Callable for TestFunction {
    const KIND: CallableKind = CallableKind::TestFunction;

    fn header(&self) -> &CallableHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut CallableHeader {
        &mut self.header
    }
}
