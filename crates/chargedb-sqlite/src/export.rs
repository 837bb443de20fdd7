// crates/chargedb-sqlite/src/export.rs
// ============================================================================
// Module: chargedb JSON Export
// Description: Flat JSON envelope export of selected tables.
// Purpose: Selective backup into a portable, named-field record format.
// Dependencies: chargedb-core, rusqlite, serde, serde_json, time, thiserror
// ============================================================================

//! ## Overview
//! Exports resolved tables into one envelope: format version, UTC export
//! timestamp, and a map of table name to an array of name-keyed records.
//! Tables absent from the database are skipped silently (an export is a
//! best-effort snapshot of what exists). Reading is side-effect free.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use chargedb_core::IdentifierError;
use chargedb_core::TableName;
use chargedb_core::TableOutcome;
use chargedb_core::TransferSpec;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value as JsonValue;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::client::Client;
use crate::client::ClientError;
use crate::client::resolve_tables;
use crate::value::sql_to_json;

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Envelope format version produced and accepted by this crate.
pub const EXPORT_FORMAT_VERSION: &str = "1";

/// The flat JSON export envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEnvelope {
    /// Envelope format version.
    pub version: String,
    /// RFC 3339 UTC timestamp of the export.
    pub exported_at: String,
    /// Table name to array of name-keyed records.
    pub tables: Map<String, JsonValue>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Untrusted table name failed the identifier grammar.
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),
    /// Client-level failure.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// Envelope serialization failed.
    #[error("failed to encode export envelope: {0}")]
    Encode(String),
}

/// Per-table result of an export run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Exported tables with their record counts.
    pub tables: Vec<TableOutcome>,
}

// ============================================================================
// SECTION: Export
// ============================================================================

impl Client {
    /// Exports the spec's resolved tables as a JSON envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] on identifier, statement, or serialization
    /// failure.
    pub fn export_json<W: Write>(
        &self,
        writer: W,
        spec: &TransferSpec,
    ) -> Result<ExportReport, ExportError> {
        let tables = resolve_tables(spec)?;
        let mut report = ExportReport::default();
        let mut table_map = Map::new();

        for table in &tables {
            if !self.table_exists(table.as_str())? {
                continue;
            }
            let records = export_table(self, table)?;
            let count = u64::try_from(records.len()).unwrap_or(u64::MAX);
            spec.report_progress(table.as_str(), count);
            report.tables.push(TableOutcome {
                table: table.as_str().to_owned(),
                rows: count,
            });
            table_map.insert(table.as_str().to_owned(), JsonValue::Array(records));
        }

        let envelope = ExportEnvelope {
            version: EXPORT_FORMAT_VERSION.to_owned(),
            exported_at: now_rfc3339()?,
            tables: table_map,
        };
        serde_json::to_writer_pretty(writer, &envelope)
            .map_err(|err| ExportError::Encode(err.to_string()))?;
        Ok(report)
    }
}

/// Reads every row of one table as a name-keyed JSON record.
fn export_table(client: &Client, table: &TableName) -> Result<Vec<JsonValue>, ClientError> {
    let sql = format!("SELECT * FROM {}", table.quoted());
    let mut stmt = client.conn().prepare(&sql).map_err(|err| ClientError::Db(err.to_string()))?;
    let column_names: Vec<String> =
        stmt.column_names().iter().map(|name| (*name).to_owned()).collect();

    let mut records = Vec::new();
    let mut rows = stmt.query([]).map_err(|err| ClientError::Db(err.to_string()))?;
    loop {
        let row = rows.next().map_err(|err| ClientError::Db(err.to_string()))?;
        let Some(row) = row else {
            break;
        };
        let mut record = Map::new();
        for (index, name) in column_names.iter().enumerate() {
            let value: rusqlite::types::Value =
                row.get(index).map_err(|err| ClientError::Db(err.to_string()))?;
            record.insert(name.clone(), sql_to_json(value));
        }
        records.push(JsonValue::Object(record));
    }
    Ok(records)
}

/// Formats the current UTC time as RFC 3339.
fn now_rfc3339() -> Result<String, ExportError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| ExportError::Encode(err.to_string()))
}
