//! Version sequence fuzz tests for the callable registry core.
// crates/callable-registry-core/tests/version_sequence_fuzz.rs
// ============================================================================
// Module: Version Sequence Fuzz Tests
// Description: Property coverage for scoped version assignment.
// Purpose: Ensure interleaved creates, updates, and renames never reuse a version.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use callable_registry_core::CallableHeaderDto;
use callable_registry_core::CallableRegistry;
use callable_registry_core::InMemoryCallableStore;
use callable_registry_core::SliceFunctionDto;
use proptest::prelude::*;

/// One registry operation drawn by the strategy.
#[derive(Debug, Clone)]
enum Op {
    /// Create in scope `(name, module)` indices.
    Create(usize, usize),
    /// Update the n-th created callable (modulo created count).
    Update(usize),
    /// Move the n-th created callable to scope `(name, module)` indices.
    Rename(usize, usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize .. 3, 0usize .. 2).prop_map(|(name, module)| Op::Create(name, module)),
        (0usize .. 64).prop_map(Op::Update),
        (0usize .. 64, 0usize .. 3, 0usize .. 2)
            .prop_map(|(index, name, module)| Op::Rename(index, name, module)),
    ]
}

const NAMES: [&str; 3] = ["gender_slice", "age_slice", "region_slice"];
const MODULES: [&str; 2] = ["bias", ""];

/// Scope indices of a saved callable.
fn scope_of(dto: &SliceFunctionDto) -> (usize, usize) {
    let name = NAMES.iter().position(|name| *name == dto.header.name).unwrap();
    let module = MODULES.iter().position(|module| *module == dto.header.module).unwrap();
    (name, module)
}

proptest! {
    #[test]
    fn versions_are_dense_per_scope(ops in prop::collection::vec(op_strategy(), 1 .. 40)) {
        let registry = CallableRegistry::without_audit(Arc::new(InMemoryCallableStore::new()));
        let mut created: Vec<SliceFunctionDto> = Vec::new();
        let mut expected: BTreeMap<(usize, usize), u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Create(name, module) => {
                    let dto = SliceFunctionDto {
                        header: CallableHeaderDto::new(NAMES[name], MODULES[module]),
                        ..SliceFunctionDto::default()
                    };
                    let saved = registry.slice_functions().save(dto).unwrap();
                    let next = expected.entry((name, module)).or_insert(0);
                    *next += 1;
                    prop_assert_eq!(saved.header.version, Some(*next));
                    created.push(saved);
                }
                Op::Update(index) => {
                    if created.is_empty() {
                        continue;
                    }
                    let target = created[index % created.len()].clone();
                    let mut update = target.clone();
                    update.header.doc = Some(format!("revision {index}"));
                    let saved = registry.slice_functions().save(update).unwrap();
                    prop_assert_eq!(saved.header.uuid, target.header.uuid);
                    prop_assert_eq!(saved.header.version, target.header.version);
                }
                Op::Rename(..) => {}
            }
        }

        for ((name, module), count) in expected {
            let history = registry.slice_functions().history(NAMES[name], MODULES[module]).unwrap();
            let versions: Vec<u32> = history.iter().filter_map(|dto| dto.header.version).collect();
            prop_assert_eq!(versions, (1 ..= count).collect::<Vec<_>>());
        }
    }

    #[test]
    fn creates_after_renames_never_reuse_versions(
        ops in prop::collection::vec(op_strategy(), 1 .. 40)
    ) {
        let registry = CallableRegistry::without_audit(Arc::new(InMemoryCallableStore::new()));
        let mut live: Vec<SliceFunctionDto> = Vec::new();
        let mut issued: BTreeMap<(usize, usize), BTreeSet<u32>> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Create(name, module) => {
                    let dto = SliceFunctionDto {
                        header: CallableHeaderDto::new(NAMES[name], MODULES[module]),
                        ..SliceFunctionDto::default()
                    };
                    let saved = registry.slice_functions().save(dto).unwrap();
                    let version = saved.header.version.unwrap();
                    let held: BTreeSet<u32> = live
                        .iter()
                        .filter(|dto| scope_of(dto) == (name, module))
                        .filter_map(|dto| dto.header.version)
                        .collect();
                    prop_assert!(!held.contains(&version));
                    prop_assert!(issued.entry((name, module)).or_default().insert(version));
                    live.push(saved);
                }
                Op::Update(index) => {
                    if live.is_empty() {
                        continue;
                    }
                    let slot = index % live.len();
                    let mut update = live[slot].clone();
                    update.header.doc = Some(format!("revision {index}"));
                    live[slot] = registry.slice_functions().save(update).unwrap();
                }
                Op::Rename(index, name, module) => {
                    if live.is_empty() {
                        continue;
                    }
                    let slot = index % live.len();
                    let mut renamed = live[slot].clone();
                    renamed.header.name = NAMES[name].to_string();
                    renamed.header.module = MODULES[module].to_string();
                    let occupied = live.iter().enumerate().any(|(other, dto)| {
                        other != slot
                            && scope_of(dto) == (name, module)
                            && dto.header.version == renamed.header.version
                    });
                    match registry.slice_functions().save(renamed.clone()) {
                        Ok(saved) => {
                            prop_assert!(!occupied);
                            prop_assert_eq!(saved.header.version, renamed.header.version);
                            live[slot] = saved;
                        }
                        Err(err) => {
                            prop_assert!(occupied);
                            prop_assert!(err.is_version_conflict());
                        }
                    }
                }
            }
        }
    }
}
