// crates/chargedb-sqlite/src/transfer.rs
// ============================================================================
// Module: chargedb Transfer Engine
// Description: Schema-reconciling row copier and transfer orchestrator.
// Purpose: Copy rows between databases whose schemas may have drifted, then
//          apply entity renames on top of the committed data.
// Dependencies: chargedb-core, rusqlite, thiserror
// ============================================================================

//! ## Overview
//! The row copier streams rows from the source restricted to the reconciled
//! (name-intersected) column set and upserts them into the destination with
//! `INSERT OR REPLACE`, inside a caller-supplied transaction. The
//! orchestrator runs either a dry-run preview (no destination transaction,
//! no mutation) or a real run: one destination transaction across every
//! table copy (all-or-nothing), then one independent transaction per rename
//! directive. A rename failure after the copy commit leaves the transferred
//! rows in place; renames are idempotent name-fixups on already-durable
//! data, not part of the copy's atomic unit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use chargedb_core::DirectiveOutcome;
use chargedb_core::EntityKind;
use chargedb_core::IdentifierError;
use chargedb_core::RenameDirective;
use chargedb_core::TableName;
use chargedb_core::TableOutcome;
use chargedb_core::TransferReport;
use chargedb_core::TransferSpec;
use chargedb_core::TransferWarning;
use chargedb_core::reconcile;
use chargedb_core::source_only;
use rusqlite::Transaction;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use thiserror::Error;

use crate::client::Client;
use crate::client::ClientError;
use crate::client::columns_on;
use crate::client::resolve_tables;
use crate::client::row_count_on;
use crate::client::table_exists_on;
use crate::rename::RenameError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Transfer errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `Copy` carries the partial row count for diagnostics; the enclosing
///   transaction rollback discards those rows.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Untrusted table name failed the identifier grammar.
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),
    /// Client-level failure (open, statement, missing table).
    #[error(transparent)]
    Client(#[from] ClientError),
    /// Source and destination share no columns for a table.
    #[error("no common columns between source and destination for table {table}")]
    SchemaIncompatible {
        /// Affected table.
        table: String,
    },
    /// Row streaming or insertion failed mid-copy.
    #[error("failed to copy table {table} after {copied} rows: {cause}")]
    Copy {
        /// Affected table.
        table: String,
        /// Rows written before the failure (discarded by rollback).
        copied: u64,
        /// Underlying cause.
        cause: String,
    },
    /// Transaction begin or commit failed.
    #[error("transaction error: {0}")]
    Tx(String),
    /// A post-commit rename directive failed.
    #[error("failed to rename {kind} \"{old}\" to \"{new}\": {cause}")]
    Rename {
        /// Entity kind being renamed.
        kind: EntityKind,
        /// Old entity name.
        old: String,
        /// New entity name.
        new: String,
        /// Underlying cause.
        cause: String,
    },
}

impl TransferError {
    /// Wraps a rename engine failure with its directive context.
    fn rename(kind: EntityKind, directive: &RenameDirective, cause: &RenameError) -> Self {
        Self::Rename {
            kind,
            old: directive.old().to_owned(),
            new: directive.new_name().to_owned(),
            cause: cause.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Row Copier
// ============================================================================

/// Result of copying one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCopy {
    /// Rows written to the destination.
    pub rows: u64,
    /// Source columns absent from the destination; their data was dropped.
    pub skipped_columns: Vec<String>,
}

/// Copies one table from the source into the caller's destination
/// transaction.
///
/// Rows are streamed in the database's natural order, restricted to the
/// reconciled column set, and upserted with `INSERT OR REPLACE`. Destination
/// columns outside the reconciled set keep their declared defaults for new
/// rows and are left untouched on conflict-replaced rows. An empty source
/// table short-circuits without issuing a row query.
///
/// # Errors
///
/// Returns [`TransferError::SchemaIncompatible`] when the column
/// intersection is empty (aborts only this table's copy) and
/// [`TransferError::Copy`] with the partial count when streaming or
/// insertion fails.
pub fn copy_table_tx(
    src: &Client,
    tx: &Transaction<'_>,
    table: &TableName,
) -> Result<TableCopy, TransferError> {
    let src_cols = columns_on(src.conn(), table)?;
    let dst_cols = columns_on(tx, table)?;

    let common = reconcile(&src_cols, &dst_cols);
    if common.is_empty() {
        return Err(TransferError::SchemaIncompatible {
            table: table.as_str().to_owned(),
        });
    }
    let skipped_columns: Vec<String> =
        source_only(&src_cols, &dst_cols).into_iter().map(|col| col.name).collect();

    if row_count_on(src.conn(), table)? == 0 {
        return Ok(TableCopy {
            rows: 0,
            skipped_columns,
        });
    }

    let column_list =
        common.iter().map(|col| format!("`{}`", col.name)).collect::<Vec<_>>().join(", ");
    let placeholders =
        (1 ..= common.len()).map(|index| format!("?{index}")).collect::<Vec<_>>().join(", ");
    let select_sql = format!("SELECT {column_list} FROM {}", table.quoted());
    let insert_sql = format!(
        "INSERT OR REPLACE INTO {} ({column_list}) VALUES ({placeholders})",
        table.quoted()
    );

    let copy_failure = |copied: u64, err: &rusqlite::Error| TransferError::Copy {
        table: table.as_str().to_owned(),
        copied,
        cause: err.to_string(),
    };

    let mut select =
        src.conn().prepare(&select_sql).map_err(|err| ClientError::Db(err.to_string()))?;
    let mut insert =
        tx.prepare_cached(&insert_sql).map_err(|err| ClientError::Db(err.to_string()))?;

    let mut copied = 0_u64;
    let mut rows = select.query([]).map_err(|err| copy_failure(copied, &err))?;
    loop {
        let Some(row) = rows.next().map_err(|err| copy_failure(copied, &err))? else {
            break;
        };
        let mut values: Vec<Value> = Vec::with_capacity(common.len());
        for index in 0 .. common.len() {
            values.push(row.get(index).map_err(|err| copy_failure(copied, &err))?);
        }
        insert.execute(params_from_iter(values)).map_err(|err| copy_failure(copied, &err))?;
        copied += 1;
    }

    Ok(TableCopy {
        rows: copied,
        skipped_columns,
    })
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Transfers selected tables from source to destination per the spec.
///
/// Dry-run mode previews everything (table existence, source row counts,
/// rename counts via the counting engine) without opening a destination
/// transaction or mutating any state. A real run copies every resolved
/// table inside one destination transaction; a single table failure rolls
/// back the entire set. Rename directives are applied only after that
/// commit, each in its own transaction.
///
/// # Errors
///
/// Returns [`TransferError`] as described per variant; on any error during a
/// real run's copy phase the destination is left exactly as it was before
/// the run.
pub fn transfer(
    src: &Client,
    dst: &mut Client,
    spec: &TransferSpec,
) -> Result<TransferReport, TransferError> {
    let tables = resolve_tables(spec)?;
    let mut report = TransferReport {
        dry_run: spec.dry_run,
        ..TransferReport::default()
    };

    if spec.dry_run {
        preview(src, dst, spec, &tables, &mut report)?;
        return Ok(report);
    }

    let tx = dst.transaction().map_err(|err| TransferError::Tx(err.to_string()))?;
    for table in &tables {
        if !table_exists_on(&tx, table.as_str())? {
            report.warnings.push(TransferWarning::MissingTable {
                table: table.as_str().to_owned(),
            });
            continue;
        }
        let copy = copy_table_tx(src, &tx, table)?;
        for column in copy.skipped_columns {
            report.warnings.push(TransferWarning::SkippedColumn {
                table: table.as_str().to_owned(),
                column,
            });
        }
        spec.report_progress(table.as_str(), copy.rows);
        report.tables.push(TableOutcome {
            table: table.as_str().to_owned(),
            rows: copy.rows,
        });
    }
    tx.commit().map_err(|err| TransferError::Tx(err.to_string()))?;

    // Renames are applied on top of committed data; each directive is its
    // own transaction and a failure here does not undo the transfer.
    for directive in &spec.loadpoint_renames {
        let outcome = dst
            .rename_entity(EntityKind::Loadpoint, directive)
            .map_err(|err| TransferError::rename(EntityKind::Loadpoint, directive, &err))?;
        report.loadpoint_renames.push(DirectiveOutcome {
            directive: directive.clone(),
            outcome,
        });
    }
    for directive in &spec.vehicle_renames {
        let outcome = dst
            .rename_entity(EntityKind::Vehicle, directive)
            .map_err(|err| TransferError::rename(EntityKind::Vehicle, directive, &err))?;
        report.vehicle_renames.push(DirectiveOutcome {
            directive: directive.clone(),
            outcome,
        });
    }

    Ok(report)
}

/// Builds the dry-run preview: table readiness, source row counts, and
/// rename counts from the counting engine.
fn preview(
    src: &Client,
    dst: &Client,
    spec: &TransferSpec,
    tables: &[TableName],
    report: &mut TransferReport,
) -> Result<(), TransferError> {
    for table in tables {
        if !dst.table_exists(table.as_str())? {
            report.warnings.push(TransferWarning::MissingTable {
                table: table.as_str().to_owned(),
            });
            continue;
        }
        report.tables.push(TableOutcome {
            table: table.as_str().to_owned(),
            rows: src.row_count(table)?,
        });
    }
    for directive in &spec.loadpoint_renames {
        let outcome = src
            .rename_entity_dry_run(EntityKind::Loadpoint, directive)
            .map_err(|err| TransferError::rename(EntityKind::Loadpoint, directive, &err))?;
        report.loadpoint_renames.push(DirectiveOutcome {
            directive: directive.clone(),
            outcome,
        });
    }
    for directive in &spec.vehicle_renames {
        let outcome = src
            .rename_entity_dry_run(EntityKind::Vehicle, directive)
            .map_err(|err| TransferError::rename(EntityKind::Vehicle, directive, &err))?;
        report.vehicle_renames.push(DirectiveOutcome {
            directive: directive.clone(),
            outcome,
        });
    }
    Ok(())
}
