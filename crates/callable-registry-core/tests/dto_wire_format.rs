// crates/callable-registry-core/tests/dto_wire_format.rs
// ============================================================================
// Module: DTO Wire Format Tests
// Description: JSON shapes accepted and produced at the DTO boundary.
// Purpose: Keep camelCase field names and optional identifiers stable.
// ============================================================================

//! ## Overview
//! Parses client-shaped JSON submissions and checks the rendered responses.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;

use callable_registry_core::CallableRegistry;
use callable_registry_core::DatasetProcessType;
use callable_registry_core::InMemoryCallableStore;
use callable_registry_core::SliceFunctionDto;
use callable_registry_core::TransformationFunctionDto;
use serde_json::Value;
use serde_json::json;

#[test]
fn submission_without_uuid_parses() {
    let dto: SliceFunctionDto = serde_json::from_value(json!({
        "name": "gender_slice",
        "module": "bias",
        "displayName": "Gender slice",
        "code": "def gender_slice(df): ...",
        "args": [{"name": "value", "type": "str", "optional": true, "defaultValue": "'F'", "argOrder": 0}],
        "cellLevel": false,
        "processType": "CLAUSES",
        "clauses": [{"columnName": "gender", "comparisonType": "IS", "value": "F"}]
    }))
    .unwrap();
    assert!(dto.header.uuid.is_none());
    assert_eq!(dto.header.display_name.as_deref(), Some("Gender slice"));
    assert_eq!(dto.header.args[0].arg_type, "str");
    assert_eq!(dto.header.args[0].default_value.as_deref(), Some("'F'"));
    assert_eq!(dto.process_type, DatasetProcessType::Clauses);
}

#[test]
fn response_always_carries_uuid_and_version() {
    let registry = CallableRegistry::without_audit(Arc::new(InMemoryCallableStore::new()));
    let dto: TransformationFunctionDto = serde_json::from_value(json!({
        "name": "lowercase",
        "module": "",
        "cellLevel": true,
        "columnType": "text"
    }))
    .unwrap();
    let saved = registry.transformation_functions().save(dto).unwrap();
    let rendered: Value = serde_json::to_value(&saved).unwrap();
    assert!(rendered["uuid"].is_string());
    assert_eq!(rendered["version"], 1);
    assert_eq!(rendered["columnType"], "text");
    assert_eq!(rendered["processType"], "CODE");
}

#[test]
fn malformed_uuid_is_rejected() {
    let result: Result<SliceFunctionDto, _> =
        serde_json::from_value(json!({"uuid": "not-a-uuid", "name": "gender_slice"}));
    assert!(result.is_err());
}
