// crates/chargedb-sqlite/src/import.rs
// ============================================================================
// Module: chargedb JSON Import
// Description: Transactional restore from the flat JSON envelope.
// Purpose: Load exported records back into a live schema, filtering unknown
//          fields instead of failing on schema drift.
// Dependencies: chargedb-core, rusqlite, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Imports run inside one transaction: either every selected table lands or
//! none does. Record fields are filtered against the live table's columns,
//! so envelopes written against a drifted schema import cleanly with the
//! unknown fields dropped. All inserts are parameterized `INSERT OR
//! REPLACE`; envelope content never reaches statement text, and table names
//! taken from the envelope pass the identifier grammar first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;

use chargedb_core::IdentifierError;
use chargedb_core::TableName;
use chargedb_core::TableOutcome;
use chargedb_core::TransferMode;
use chargedb_core::TransferSpec;
use chargedb_core::TransferWarning;
use rusqlite::Transaction;
use rusqlite::params_from_iter;
use rusqlite::types::Value as SqlValue;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::client::CONFIG_TABLES;
use crate::client::Client;
use crate::client::ClientError;
use crate::client::METRICS_TABLES;
use crate::client::columns_on;
use crate::export::EXPORT_FORMAT_VERSION;
use crate::export::ExportEnvelope;
use crate::value::json_to_sql;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Import errors.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Envelope is not valid JSON in the expected shape.
    #[error("failed to decode import envelope: {0}")]
    Decode(String),
    /// Envelope was written by an unsupported format version.
    #[error("unsupported export format version: {0}")]
    UnsupportedVersion(String),
    /// Table name from the spec or envelope failed the identifier grammar.
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),
    /// Client-level failure.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// Transaction begin or commit failed.
    #[error("transaction error: {0}")]
    Tx(String),
}

/// Result of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Imported tables with their record counts.
    pub tables: Vec<TableOutcome>,
    /// Tables present in the envelope but absent from the database.
    pub warnings: Vec<TransferWarning>,
}

// ============================================================================
// SECTION: Import
// ============================================================================

impl Client {
    /// Imports a JSON envelope into this database.
    ///
    /// Table selection follows the spec: an explicit list overrides the
    /// mode; [`TransferMode::All`] imports every table the envelope holds.
    /// The whole import is one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] on decode, version, identifier, statement,
    /// or transaction failure; on any failure the database is unchanged.
    pub fn import_json<R: Read>(
        &mut self,
        reader: R,
        spec: &TransferSpec,
    ) -> Result<ImportReport, ImportError> {
        let envelope: ExportEnvelope =
            serde_json::from_reader(reader).map_err(|err| ImportError::Decode(err.to_string()))?;
        if envelope.version != EXPORT_FORMAT_VERSION {
            return Err(ImportError::UnsupportedVersion(envelope.version));
        }

        let tables = import_tables(spec, &envelope)?;
        let mut report = ImportReport::default();

        let tx = self.transaction().map_err(|err| ImportError::Tx(err.to_string()))?;
        for table in &tables {
            let Some(JsonValue::Array(records)) = envelope.tables.get(table.as_str()) else {
                continue;
            };
            let live_columns = match columns_on(&tx, table) {
                Ok(columns) => columns,
                Err(ClientError::TableNotFound(_)) => {
                    report.warnings.push(TransferWarning::MissingTable {
                        table: table.as_str().to_owned(),
                    });
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            let live_names: Vec<String> =
                live_columns.into_iter().map(|column| column.name).collect();
            let count = import_table_tx(&tx, table, &live_names, records)?;
            spec.report_progress(table.as_str(), count);
            report.tables.push(TableOutcome {
                table: table.as_str().to_owned(),
                rows: count,
            });
        }
        tx.commit().map_err(|err| ImportError::Tx(err.to_string()))?;
        Ok(report)
    }
}

/// Resolves which tables an import should touch.
fn import_tables(
    spec: &TransferSpec,
    envelope: &ExportEnvelope,
) -> Result<Vec<TableName>, IdentifierError> {
    if !spec.tables.is_empty() {
        return spec.tables.iter().map(TableName::parse).collect();
    }
    match spec.mode {
        TransferMode::Config => CONFIG_TABLES.iter().copied().map(TableName::parse).collect(),
        TransferMode::Metrics => METRICS_TABLES.iter().copied().map(TableName::parse).collect(),
        // Envelope keys are untrusted input; each must pass the grammar.
        TransferMode::All => envelope.tables.keys().map(TableName::parse).collect(),
    }
}

/// Imports one table's records inside the caller's transaction.
///
/// Fields unknown to the live schema are dropped; records with no known
/// fields are skipped entirely.
fn import_table_tx(
    tx: &Transaction<'_>,
    table: &TableName,
    live_names: &[String],
    records: &[JsonValue],
) -> Result<u64, ImportError> {
    let mut imported = 0_u64;
    for record in records {
        let JsonValue::Object(fields) = record else {
            continue;
        };
        let mut columns: Vec<&str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();
        for name in live_names {
            if let Some(value) = fields.get(name) {
                columns.push(name.as_str());
                values.push(json_to_sql(value));
            }
        }
        if columns.is_empty() {
            continue;
        }
        let column_list =
            columns.iter().map(|name| format!("`{name}`")).collect::<Vec<_>>().join(", ");
        let placeholders =
            (1 ..= columns.len()).map(|index| format!("?{index}")).collect::<Vec<_>>().join(", ");
        let sql = format!(
            "INSERT OR REPLACE INTO {} ({column_list}) VALUES ({placeholders})",
            table.quoted()
        );
        let mut stmt =
            tx.prepare_cached(&sql).map_err(|err| ClientError::Db(err.to_string()))?;
        stmt.execute(params_from_iter(values)).map_err(|err| ClientError::Db(err.to_string()))?;
        imported += 1;
    }
    Ok(imported)
}
