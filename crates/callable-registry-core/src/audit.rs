// crates/callable-registry-core/src/audit.rs
// ============================================================================
// Module: Registry Audit Logging
// Description: Structured audit events for callable writes.
// Purpose: Emit JSON-lines audit logs without hard logging dependencies.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for registry writes.
//! It is intentionally lightweight so deployments can route events to their
//! preferred logging pipeline. Events never embed callable source code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::CallableId;
use crate::core::CallableKind;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of a successful upsert.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    /// A new callable was created and versioned.
    Created,
    /// An existing callable was updated in place.
    Updated,
}

/// Registry audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Callable kind.
    pub kind: CallableKind,
    /// Callable identifier, when one was resolved.
    pub callable_id: Option<CallableId>,
    /// Callable name.
    pub name: String,
    /// Callable module.
    pub module: String,
    /// Stored or contested version.
    pub version: Option<u32>,
    /// Save outcome for successful writes.
    pub action: Option<SaveAction>,
    /// Failure reason for rejected writes.
    pub reason: Option<String>,
}

impl RegistryAuditEvent {
    /// Creates a `callable_saved` event with a consistent timestamp.
    #[must_use]
    pub fn saved(
        kind: CallableKind,
        callable_id: CallableId,
        name: &str,
        module: &str,
        version: u32,
        action: SaveAction,
    ) -> Self {
        Self {
            event: "callable_saved",
            timestamp_ms: now_millis(),
            kind,
            callable_id: Some(callable_id),
            name: name.to_string(),
            module: module.to_string(),
            version: Some(version),
            action: Some(action),
            reason: None,
        }
    }

    /// Creates a `callable_conflict` event for a rejected write.
    #[must_use]
    pub fn conflict(
        kind: CallableKind,
        callable_id: Option<CallableId>,
        name: &str,
        module: &str,
        version: Option<u32>,
        reason: String,
    ) -> Self {
        Self {
            event: "callable_conflict",
            timestamp_ms: now_millis(),
            kind,
            callable_id,
            name: name.to_string(),
            module: module.to_string(),
            version,
            action: None,
            reason: Some(reason),
        }
    }
}

/// Returns wall-clock milliseconds since the unix epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for registry events.
pub trait RegistryAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &RegistryAuditEvent);
}

/// Audit sink that drops every event.
pub struct NoopAuditSink;

impl RegistryAuditSink for NoopAuditSink {
    fn record(&self, _event: &RegistryAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl RegistryAuditSink for StderrAuditSink {
    fn record(&self, event: &RegistryAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RegistryAuditSink for FileAuditSink {
    fn record(&self, event: &RegistryAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
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
    fn file_sink_appends_one_json_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let sink = FileAuditSink::new(&path).unwrap();
        let id = CallableId::random();
        sink.record(&RegistryAuditEvent::saved(
            CallableKind::SliceFunction,
            id,
            "gender_slice",
            "bias",
            1,
            SaveAction::Created,
        ));
        sink.record(&RegistryAuditEvent::conflict(
            CallableKind::SliceFunction,
            None,
            "gender_slice",
            "bias",
            Some(2),
            "version taken".to_string(),
        ));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> =
            contents.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "callable_saved");
        assert_eq!(lines[0]["kind"], "slice_function");
        assert_eq!(lines[0]["action"], "created");
        assert_eq!(lines[0]["callable_id"], id.to_string());
        assert_eq!(lines[1]["event"], "callable_conflict");
        assert_eq!(lines[1]["reason"], "version taken");
    }
}
