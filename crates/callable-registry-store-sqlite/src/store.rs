// crates/callable-registry-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Callable Store
// Description: Durable CallableStore backed by SQLite WAL.
// Purpose: Persist versioned callables with integrity-checked payloads.
// Dependencies: callable-registry-core, rusqlite, serde, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`CallableStore`] using `SQLite`. Every
//! callable kind shares the `callables` table. Indexed columns mirror the
//! header; the full entity is stored as JSON alongside its SHA-256 digest and
//! loads fail closed when either disagrees. The append-only `callable_scopes`
//! ledger records every (scope, identifier) pair a save has produced and backs
//! `count_by_name_and_module`.
//!
//! A [`UnitOfWork`] opens `BEGIN IMMEDIATE` on the shared connection and holds
//! the store's [`TransactionGate`] until it commits or rolls back, so the
//! count and the insert of one create observe the same snapshot.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use callable_registry_core::Callable;
use callable_registry_core::CallableId;
use callable_registry_core::CallableKind;
use callable_registry_core::CallableStore;
use callable_registry_core::CallableVersion;
use callable_registry_core::RegistryError;
use callable_registry_core::StoreError;
use callable_registry_core::StoredCallable;
use callable_registry_core::TransactionGate;
use callable_registry_core::UnitOfWork;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;
use serde::Deserialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum serialized callable size accepted by the store.
pub const MAX_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;
/// Column list shared by every callable query.
const CALLABLE_COLUMNS: &str = "id, kind, name, module, version, payload_json, payload_hash";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` callable store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default pragmas.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
    /// Unique scope constraint rejected the write.
    #[error("sqlite store version conflict: {kind} {module}:{name} version {version}")]
    VersionConflict {
        /// Callable kind.
        kind: CallableKind,
        /// Callable name.
        name: String,
        /// Callable module.
        module: String,
        /// Version already taken in the scope.
        version: CallableVersion,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => {
                Self::Invalid(format!("schema version mismatch: {message}"))
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "payload_json exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
            SqliteStoreError::VersionConflict {
                kind,
                name,
                module,
                version,
            } => Self::VersionConflict {
                kind,
                name,
                module,
                version,
            },
        }
    }
}

/// Maps an engine error into a store error.
#[allow(clippy::needless_pass_by_value, reason = "Used directly as a map_err adapter.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed callable store with WAL support.
#[derive(Clone)]
pub struct SqliteCallableStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
    /// Gate serializing units of work on the shared connection.
    gate: Arc<TransactionGate>,
}

impl SqliteCallableStore {
    /// Opens an `SQLite`-backed callable store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
            gate: Arc::new(TransactionGate::new()),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }

    /// Loads the record with `id`, whatever its kind.
    fn load_record(&self, id: CallableId) -> Result<Option<StoredCallable>, SqliteStoreError> {
        let row = {
            let guard = self.lock()?;
            guard
                .query_row(
                    &format!("SELECT {CALLABLE_COLUMNS} FROM callables WHERE id = ?1"),
                    params![id.to_string()],
                    RawRow::read,
                )
                .optional()
                .map_err(db_error)?
        };
        row.map(RawRow::into_record).transpose()
    }

    /// Loads every record in one (kind, name, module) scope by ascending version.
    fn load_scope(
        &self,
        kind: CallableKind,
        name: &str,
        module: &str,
    ) -> Result<Vec<StoredCallable>, SqliteStoreError> {
        let rows = {
            let guard = self.lock()?;
            let mut statement = guard
                .prepare(&format!(
                    "SELECT {CALLABLE_COLUMNS} FROM callables WHERE kind = ?1 AND name = ?2 AND \
                     module = ?3 ORDER BY version ASC"
                ))
                .map_err(db_error)?;
            let rows = statement
                .query_map(params![kind.as_str(), name, module], RawRow::read)
                .map_err(db_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_error)?;
            rows
        };
        rows.into_iter().map(RawRow::into_record).collect()
    }

    /// Returns the version count one (kind, name, module) scope has consumed.
    ///
    /// Reads the `callable_scopes` ledger rather than live rows, so callables
    /// renamed out of the scope still count and a renamed-in version is never
    /// handed out again.
    fn count_scope(
        &self,
        kind: CallableKind,
        name: &str,
        module: &str,
    ) -> Result<u64, SqliteStoreError> {
        let (held, highest): (i64, i64) = self
            .lock()?
            .query_row(
                "SELECT COUNT(*), COALESCE(MAX(version), 0) FROM callable_scopes WHERE kind = ?1 \
                 AND name = ?2 AND module = ?3",
                params![kind.as_str(), name, module],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(db_error)?;
        u64::try_from(held.max(highest))
            .map_err(|_| SqliteStoreError::Corrupt(format!("negative scope count {held}")))
    }

    /// Inserts or replaces a record by identifier and records its scope.
    fn write_record(&self, record: &StoredCallable) -> Result<(), SqliteStoreError> {
        let payload =
            serde_json::to_vec(&record.payload).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        if payload.len() > MAX_PAYLOAD_BYTES {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: MAX_PAYLOAD_BYTES,
                actual_bytes: payload.len(),
            });
        }
        let digest = sha256_hex(&payload);
        let id = record.id.to_string();
        let mut guard = self.lock()?;
        let savepoint = guard.savepoint().map_err(db_error)?;
        let existing_kind: Option<String> = savepoint
            .query_row("SELECT kind FROM callables WHERE id = ?1", params![id], |row| row.get(0))
            .optional()
            .map_err(db_error)?;
        if let Some(existing_kind) = existing_kind
            && existing_kind != record.kind.as_str()
        {
            return Err(SqliteStoreError::Invalid(format!(
                "identifier {id} already belongs to a {existing_kind}"
            )));
        }
        let written = savepoint.execute(
            "INSERT INTO callables (id, kind, name, module, version, payload_json, payload_hash, \
             saved_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) ON CONFLICT(id) DO UPDATE SET \
             name = excluded.name, module = excluded.module, version = excluded.version, \
             payload_json = excluded.payload_json, payload_hash = excluded.payload_hash, \
             saved_at = excluded.saved_at",
            params![
                id,
                record.kind.as_str(),
                record.name,
                record.module,
                i64::from(record.version.get()),
                payload,
                digest,
                unix_millis()
            ],
        );
        match written {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(SqliteStoreError::VersionConflict {
                    kind: record.kind,
                    name: record.name.clone(),
                    module: record.module.clone(),
                    version: record.version,
                });
            }
            Err(err) => return Err(db_error(err)),
        }
        savepoint
            .execute(
                "INSERT OR IGNORE INTO callable_scopes (kind, name, module, id, version) VALUES \
                 (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.kind.as_str(),
                    record.name,
                    record.module,
                    id,
                    i64::from(record.version.get())
                ],
            )
            .map_err(db_error)?;
        savepoint.commit().map_err(db_error)?;
        drop(guard);
        Ok(())
    }

    /// Runs a transaction-control statement on the shared connection.
    fn control(&self, statement: &str) -> Result<(), SqliteStoreError> {
        self.lock()?.execute_batch(statement).map_err(db_error)
    }

    /// Confirms the schema version recorded in `store_meta`.
    fn check_schema(&self) -> Result<(), SqliteStoreError> {
        let version: Option<i64> = self
            .lock()?
            .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
            .optional()
            .map_err(db_error)?;
        match version {
            Some(value) if value == SCHEMA_VERSION => Ok(()),
            Some(value) => {
                Err(SqliteStoreError::VersionMismatch(format!("unsupported schema version: {value}")))
            }
            None => Err(SqliteStoreError::Corrupt("store_meta is empty".to_string())),
        }
    }
}

impl<T: Callable> CallableStore<T> for SqliteCallableStore {
    fn find_by_id(&self, id: CallableId) -> Result<Option<T>, StoreError> {
        let _gate = self.gate.enter();
        match self.load_record(id)? {
            Some(record) if record.kind == T::KIND => record.decode().map(Some),
            _ => Ok(None),
        }
    }

    fn find_by_name_and_module(&self, name: &str, module: &str) -> Result<Vec<T>, StoreError> {
        let _gate = self.gate.enter();
        let records = self.load_scope(T::KIND, name, module)?;
        records.iter().map(StoredCallable::decode).collect()
    }

    fn count_by_name_and_module(&self, name: &str, module: &str) -> Result<u64, StoreError> {
        let _gate = self.gate.enter();
        self.count_scope(T::KIND, name, module).map_err(StoreError::from)
    }

    fn save(&self, entity: T) -> Result<T, StoreError> {
        let _gate = self.gate.enter();
        let record = StoredCallable::encode(&entity)?;
        self.write_record(&record)?;
        Ok(entity)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        let _gate = self.gate.enter();
        self.check_schema().map_err(StoreError::from)
    }
}

impl UnitOfWork for SqliteCallableStore {
    fn run<R, F>(&self, work: F) -> Result<R, RegistryError>
    where
        F: FnOnce() -> Result<R, RegistryError>,
    {
        let gate = self.gate.enter();
        if !gate.is_outermost() {
            return work();
        }
        self.control("BEGIN IMMEDIATE").map_err(StoreError::from)?;
        let mut rollback = Rollback {
            connection: &self.connection,
            armed: true,
        };
        let result = work();
        if result.is_ok() {
            self.control("COMMIT").map_err(StoreError::from)?;
            rollback.armed = false;
        }
        result
    }
}

/// Rolls back the open transaction unless the unit of work committed.
struct Rollback<'a> {
    /// Connection holding the open transaction.
    connection: &'a Mutex<Connection>,
    /// Whether the transaction still needs a rollback.
    armed: bool,
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        if self.armed {
            let connection = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = connection.execute_batch("ROLLBACK");
        }
    }
}

// ============================================================================
// SECTION: Rows
// ============================================================================

/// Raw `callables` row before validation.
struct RawRow {
    /// Identifier column.
    id: String,
    /// Kind label column.
    kind: String,
    /// Name column.
    name: String,
    /// Module column.
    module: String,
    /// Version column.
    version: i64,
    /// Serialized entity.
    payload: Vec<u8>,
    /// Stored payload digest.
    hash: String,
}

impl RawRow {
    /// Reads a row selected with [`CALLABLE_COLUMNS`].
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            name: row.get(2)?,
            module: row.get(3)?,
            version: row.get(4)?,
            payload: row.get(5)?,
            hash: row.get(6)?,
        })
    }

    /// Validates columns and digest, producing a kind-erased record.
    fn into_record(self) -> Result<StoredCallable, SqliteStoreError> {
        let id = CallableId::from_str(&self.id)
            .map_err(|_| SqliteStoreError::Corrupt(format!("invalid callable id {}", self.id)))?;
        let kind = CallableKind::from_label(&self.kind).ok_or_else(|| {
            SqliteStoreError::Corrupt(format!("unknown callable kind {} for {id}", self.kind))
        })?;
        let version = u32::try_from(self.version)
            .ok()
            .and_then(CallableVersion::from_raw)
            .ok_or_else(|| {
                SqliteStoreError::Corrupt(format!("invalid version {} for {id}", self.version))
            })?;
        if self.payload.len() > MAX_PAYLOAD_BYTES {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: MAX_PAYLOAD_BYTES,
                actual_bytes: self.payload.len(),
            });
        }
        if sha256_hex(&self.payload) != self.hash {
            return Err(SqliteStoreError::Corrupt(format!("hash mismatch for callable {id}")));
        }
        let payload = serde_json::from_slice(&self.payload)
            .map_err(|err| SqliteStoreError::Corrupt(err.to_string()))?;
        Ok(StoredCallable {
            kind,
            id,
            name: self.name,
            module: self.module,
            version,
            payload,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms)).map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS callables (
                    id TEXT PRIMARY KEY,
                    kind TEXT NOT NULL,
                    name TEXT NOT NULL,
                    module TEXT NOT NULL,
                    version INTEGER NOT NULL CHECK (version >= 1),
                    payload_json BLOB NOT NULL,
                    payload_hash TEXT NOT NULL,
                    saved_at INTEGER NOT NULL,
                    UNIQUE (kind, name, module, version)
                );
                CREATE INDEX IF NOT EXISTS idx_callables_scope
                    ON callables (kind, name, module);
                CREATE TABLE IF NOT EXISTS callable_scopes (
                    kind TEXT NOT NULL,
                    name TEXT NOT NULL,
                    module TEXT NOT NULL,
                    id TEXT NOT NULL,
                    version INTEGER NOT NULL CHECK (version >= 1),
                    PRIMARY KEY (kind, name, module, id)
                );",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}

/// Returns true when `err` is a UNIQUE constraint violation.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Returns the lowercase hex SHA-256 digest of `bytes`.
fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
