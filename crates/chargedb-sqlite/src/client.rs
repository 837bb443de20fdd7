// crates/chargedb-sqlite/src/client.rs
// ============================================================================
// Module: chargedb Client
// Description: Owned SQLite connection handle with schema inspection.
// Purpose: Open/close lifecycle, column metadata, row counts, and table-set
//          resolution for transfer, export, and import.
// Dependencies: chargedb-core, rusqlite, thiserror
// ============================================================================

//! ## Overview
//! [`Client`] owns one `rusqlite::Connection` with an explicit open/close
//! lifecycle; there is no process-wide connection state. The schema
//! inspector reads column metadata via `PRAGMA table_info` and never mutates
//! anything. Table names from untrusted input pass through
//! [`TableName`] before they reach statement text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use chargedb_core::Column;
use chargedb_core::IdentifierError;
use chargedb_core::TableName;
use chargedb_core::TransferMode;
use chargedb_core::TransferSpec;
use rusqlite::Connection;
use rusqlite::Transaction;
use thiserror::Error;

// ============================================================================
// SECTION: Table Sets
// ============================================================================

/// Configuration tables covered by [`TransferMode::Config`].
pub const CONFIG_TABLES: [&str; 3] = ["settings", "configs", "caches"];

/// Metrics tables covered by [`TransferMode::Metrics`].
pub const METRICS_TABLES: [&str; 3] = ["meters", "sessions", "grid_sessions"];

/// Resolves the participating tables for a spec.
///
/// An explicit table list always overrides the coarse mode and is validated
/// against the identifier grammar before any statement is built. Mode-derived
/// names come from the fixed table sets above.
///
/// # Errors
///
/// Returns [`IdentifierError`] when an explicit table name fails the grammar.
pub fn resolve_tables(spec: &TransferSpec) -> Result<Vec<TableName>, IdentifierError> {
    if !spec.tables.is_empty() {
        return spec.tables.iter().map(TableName::parse).collect();
    }
    let names: Vec<&str> = match spec.mode {
        TransferMode::Config => CONFIG_TABLES.to_vec(),
        TransferMode::Metrics => METRICS_TABLES.to_vec(),
        TransferMode::All => CONFIG_TABLES.iter().chain(METRICS_TABLES.iter()).copied().collect(),
    };
    names.into_iter().map(TableName::parse).collect()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Client errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Database could not be opened or probed.
    #[error("failed to open database {path}: {cause}")]
    Open {
        /// Path that failed to open.
        path: String,
        /// Underlying cause.
        cause: String,
    },
    /// Statement execution failed.
    #[error("database error: {0}")]
    Db(String),
    /// Requested table does not exist.
    #[error("table not found: {0}")]
    TableNotFound(String),
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Owned connection to one application database.
pub struct Client {
    /// Owned database connection.
    conn: Connection,
    /// Path the connection was opened from.
    path: PathBuf,
}

impl Client {
    /// Opens a database file and probes that it is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Open`] when the file cannot be opened or the
    /// probe statement fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|err| ClientError::Open {
            path: path.display().to_string(),
            cause: err.to_string(),
        })?;
        conn.query_row("SELECT 1", [], |_| Ok(())).map_err(|err| ClientError::Open {
            path: path.display().to_string(),
            cause: err.to_string(),
        })?;
        Ok(Self {
            conn,
            path,
        })
    }

    /// Opens an in-memory database (primarily for tooling and tests).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Open`] when the connection cannot be created.
    pub fn open_in_memory() -> Result<Self, ClientError> {
        let conn = Connection::open_in_memory().map_err(|err| ClientError::Open {
            path: ":memory:".to_owned(),
            cause: err.to_string(),
        })?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    /// Returns the path the connection was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Closes the connection explicitly.
    ///
    /// Dropping the client closes it too; this form surfaces the error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Db`] when SQLite reports a close failure.
    pub fn close(self) -> Result<(), ClientError> {
        self.conn.close().map_err(|(_, err)| ClientError::Db(err.to_string()))
    }

    /// Returns a shared reference to the underlying connection.
    pub(crate) const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begins a transaction on the underlying connection.
    pub(crate) fn transaction(&mut self) -> Result<Transaction<'_>, ClientError> {
        self.conn.transaction().map_err(|err| ClientError::Db(err.to_string()))
    }

    /// Lists user tables, excluding SQLite internals, in name order.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Db`] when the catalog query fails.
    pub fn tables(&self) -> Result<Vec<String>, ClientError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE \
                 'sqlite_%' ORDER BY name",
            )
            .map_err(|err| ClientError::Db(err.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|err| ClientError::Db(err.to_string()))?;
        let mut tables = Vec::new();
        for row in rows {
            tables.push(row.map_err(|err| ClientError::Db(err.to_string()))?);
        }
        Ok(tables)
    }

    /// Checks whether a table exists.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Db`] when the catalog query fails.
    pub fn table_exists(&self, name: &str) -> Result<bool, ClientError> {
        table_exists_on(&self.conn, name)
    }

    /// Returns column metadata for a table, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TableNotFound`] when the table is absent and
    /// [`ClientError::Db`] on statement failure.
    pub fn columns(&self, table: &TableName) -> Result<Vec<Column>, ClientError> {
        columns_on(&self.conn, table)
    }

    /// Returns the number of rows in a table.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Db`] when the count query fails.
    pub fn row_count(&self, table: &TableName) -> Result<u64, ClientError> {
        row_count_on(&self.conn, table)
    }
}

// ============================================================================
// SECTION: Connection-Level Inspection
// ============================================================================

/// Checks table existence on an arbitrary connection (or transaction).
pub(crate) fn table_exists_on(conn: &Connection, name: &str) -> Result<bool, ClientError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .map_err(|err| ClientError::Db(err.to_string()))?;
    Ok(count > 0)
}

/// Reads column metadata on an arbitrary connection (or transaction).
pub(crate) fn columns_on(conn: &Connection, table: &TableName) -> Result<Vec<Column>, ClientError> {
    let sql = format!("PRAGMA table_info({})", table.quoted());
    let mut stmt = conn.prepare(&sql).map_err(|err| ClientError::Db(err.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Column {
                name: row.get(1)?,
                decl_type: row.get(2)?,
                not_null: row.get::<_, i64>(3)? != 0,
                default_value: row.get(4)?,
                primary_key: row.get::<_, i64>(5)? != 0,
            })
        })
        .map_err(|err| ClientError::Db(err.to_string()))?;
    let mut columns = Vec::new();
    for row in rows {
        columns.push(row.map_err(|err| ClientError::Db(err.to_string()))?);
    }
    // PRAGMA table_info reports nothing (rather than failing) for a missing
    // table.
    if columns.is_empty() && !table_exists_on(conn, table.as_str())? {
        return Err(ClientError::TableNotFound(table.as_str().to_owned()));
    }
    Ok(columns)
}

/// Counts rows on an arbitrary connection (or transaction).
pub(crate) fn row_count_on(conn: &Connection, table: &TableName) -> Result<u64, ClientError> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.quoted());
    let count: i64 = conn
        .query_row(&sql, [], |row| row.get(0))
        .map_err(|err| ClientError::Db(err.to_string()))?;
    Ok(u64::try_from(count).unwrap_or_default())
}
