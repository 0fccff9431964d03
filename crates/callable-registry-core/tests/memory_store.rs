// crates/callable-registry-core/tests/memory_store.rs
// ============================================================================
// Module: In-Memory Store Tests
// Description: Uniqueness, rollback, and concurrency of the in-memory store.
// Purpose: Ensure the reference store enforces durable-store rules.
// ============================================================================

//! ## Overview
//! Exercises [`InMemoryCallableStore`] directly and through concurrent
//! registry writers.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use callable_registry_core::CallableHeader;
use callable_registry_core::CallableHeaderDto;
use callable_registry_core::CallableId;
use callable_registry_core::CallableRegistry;
use callable_registry_core::CallableStore;
use callable_registry_core::CallableVersion;
use callable_registry_core::InMemoryCallableStore;
use callable_registry_core::RegistryError;
use callable_registry_core::RetryPolicy;
use callable_registry_core::SliceFunction;
use callable_registry_core::SliceFunctionDto;
use callable_registry_core::StoreError;
use callable_registry_core::UnitOfWork;
use callable_registry_core::retry_on_conflict;

fn slice_entity(name: &str, module: &str, version: CallableVersion) -> SliceFunction {
    SliceFunction::new(CallableHeader::new(CallableId::random(), name, module).with_version(version))
}

fn slice_dto(name: &str, module: &str) -> SliceFunctionDto {
    SliceFunctionDto {
        header: CallableHeaderDto::new(name, module),
        ..SliceFunctionDto::default()
    }
}

// ============================================================================
// SECTION: Uniqueness
// ============================================================================

#[test]
fn racing_creators_collide_on_version() {
    let store = InMemoryCallableStore::new();
    let count = CallableStore::<SliceFunction>::count_by_name_and_module(&store, "s", "m").unwrap();
    let version = CallableVersion::after_count(count).unwrap();

    store.save(slice_entity("s", "m", version)).unwrap();
    let err = store.save(slice_entity("s", "m", version)).unwrap_err();
    assert!(matches!(err, StoreError::VersionConflict { version: v, .. } if v == version));
    assert_eq!(CallableStore::<SliceFunction>::count_by_name_and_module(&store, "s", "m").unwrap(), 1);
}

#[test]
fn resaving_the_same_identifier_replaces_in_place() {
    let store = InMemoryCallableStore::new();
    let mut entity = slice_entity("s", "m", CallableVersion::FIRST);
    store.save(entity.clone()).unwrap();
    entity.header.doc = Some("updated".to_string());
    store.save(entity.clone()).unwrap();

    let found: SliceFunction = store.find_by_id(entity.header.id()).unwrap().unwrap();
    assert_eq!(found, entity);
    assert_eq!(CallableStore::<SliceFunction>::count_by_name_and_module(&store, "s", "m").unwrap(), 1);
}

#[test]
fn history_is_sorted_by_version() {
    let store = InMemoryCallableStore::new();
    for raw in [3, 1, 2] {
        store.save(slice_entity("s", "m", CallableVersion::from_raw(raw).unwrap())).unwrap();
    }
    let history: Vec<SliceFunction> = store.find_by_name_and_module("s", "m").unwrap();
    let versions: Vec<u32> = history.iter().map(|entity| entity.header.version().get()).collect();
    assert_eq!(versions, vec![1, 2, 3]);
}

// ============================================================================
// SECTION: Scope Ledger
// ============================================================================

#[test]
fn create_after_rename_takes_next_version() {
    let registry = CallableRegistry::without_audit(Arc::new(InMemoryCallableStore::new()));
    let service = registry.slice_functions();
    let first = service.save(slice_dto("gender_slice", "bias")).unwrap();
    service.save(slice_dto("gender_slice", "bias")).unwrap();

    let mut renamed = first.clone();
    renamed.header.name = "sex_slice".to_string();
    service.save(renamed).unwrap();

    let third = retry_on_conflict(RetryPolicy::default(), || {
        service.save(slice_dto("gender_slice", "bias"))
    })
    .unwrap();
    assert_eq!(third.header.version, Some(3));
    let renamed_scope = service.save(slice_dto("sex_slice", "bias")).unwrap();
    assert_eq!(renamed_scope.header.version, Some(2));
}

#[test]
fn count_covers_versions_renamed_into_scope() {
    let store = InMemoryCallableStore::new();
    let mut imported = slice_entity("age_slice", "bias", CallableVersion::from_raw(3).unwrap());
    store.save(imported.clone()).unwrap();
    imported.header.name = "region_slice".to_string();
    store.save(imported).unwrap();

    let count =
        CallableStore::<SliceFunction>::count_by_name_and_module(&store, "region_slice", "bias").unwrap();
    assert_eq!(count, 3);
    let next = CallableVersion::after_count(count).unwrap();
    store.save(slice_entity("region_slice", "bias", next)).unwrap();
}

#[test]
fn rolled_back_save_leaves_scope_ledger_untouched() {
    let store = InMemoryCallableStore::new();
    let result: Result<(), RegistryError> = store.run(|| {
        store.save(slice_entity("s", "m", CallableVersion::FIRST))?;
        Err(RegistryError::Invalid("abort".to_string()))
    });
    assert!(result.is_err());
    assert_eq!(CallableStore::<SliceFunction>::count_by_name_and_module(&store, "s", "m").unwrap(), 0);
}

// ============================================================================
// SECTION: Units of Work
// ============================================================================

#[test]
fn failed_unit_of_work_rolls_back_writes() {
    let store = InMemoryCallableStore::new();
    let result: Result<(), RegistryError> = store.run(|| {
        store.save(slice_entity("s", "m", CallableVersion::FIRST))?;
        Err(RegistryError::Invalid("abort".to_string()))
    });
    assert!(result.is_err());
    assert_eq!(CallableStore::<SliceFunction>::count_by_name_and_module(&store, "s", "m").unwrap(), 0);
}

#[test]
fn nested_unit_of_work_joins_the_outer_scope() {
    let store = InMemoryCallableStore::new();
    let result: Result<(), RegistryError> = store.run(|| {
        store.run(|| {
            store.save(slice_entity("s", "m", CallableVersion::FIRST))?;
            Ok(())
        })?;
        Err(RegistryError::Invalid("outer abort".to_string()))
    });
    assert!(result.is_err());
    assert_eq!(CallableStore::<SliceFunction>::count_by_name_and_module(&store, "s", "m").unwrap(), 0);
}

#[test]
fn committed_unit_of_work_keeps_writes() {
    let store = InMemoryCallableStore::new();
    let entity = slice_entity("s", "m", CallableVersion::FIRST);
    let id = entity.header.id();
    store
        .run(|| {
            store.save(entity)?;
            Ok(())
        })
        .unwrap();
    let found: Option<SliceFunction> = store.find_by_id(id).unwrap();
    assert!(found.is_some());
}

// ============================================================================
// SECTION: Concurrency
// ============================================================================

#[test]
fn concurrent_creators_receive_distinct_versions() {
    let registry = Arc::new(CallableRegistry::without_audit(Arc::new(InMemoryCallableStore::new())));
    let writers = 8;
    thread::scope(|scope| {
        for _ in 0 .. writers {
            let registry = Arc::clone(&registry);
            scope.spawn(move || {
                retry_on_conflict(RetryPolicy::default(), || {
                    registry.slice_functions().save(slice_dto("gender_slice", "bias"))
                })
                .unwrap();
            });
        }
    });

    let history = registry.slice_functions().history("gender_slice", "bias").unwrap();
    let versions: BTreeSet<u32> = history.iter().filter_map(|dto| dto.header.version).collect();
    assert_eq!(versions, (1 ..= writers).collect());
}
