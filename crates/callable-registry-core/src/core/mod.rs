// crates/callable-registry-core/src/core/mod.rs
// ============================================================================
// Module: Callable Registry Core Types
// Description: Canonical callable entities, identifiers, and external forms.
// Purpose: Provide stable, serializable types shared by every callable kind.
// Dependencies: serde, serde_json, uuid
// ============================================================================

//! ## Overview
//! Core types define the identity and version model for callable artifacts,
//! the concrete callable kinds, and their external (DTO) representations.
//! These types are the canonical source of truth for any derived API surface.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod callable;
pub mod dto;
pub mod identifiers;
pub mod kinds;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use callable::Callable;
pub use callable::CallableHeader;
pub use callable::CallableKind;
pub use callable::FunctionArgument;
pub use dto::CallableDto;
pub use dto::CallableHeaderDto;
pub use dto::SliceFunctionDto;
pub use dto::TestFunctionDto;
pub use dto::TransformationFunctionDto;
pub use identifiers::CallableId;
pub use identifiers::CallableVersion;
pub use kinds::DatasetProcessType;
pub use kinds::SliceFunction;
pub use kinds::TestFunction;
pub use kinds::TransformationFunction;
