// crates/chargedb-core/src/transfer.rs
// ============================================================================
// Module: chargedb Transfer Specification
// Description: Table selection, dry-run flag, progress observer, and the
//              transfer report model.
// Purpose: Describe what a transfer should do and report what it did without
//          the library ever printing.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`TransferSpec`] selects the participating tables (an explicit list
//! always overrides the coarse [`TransferMode`]), carries the rename
//! directives for both entity kinds, and optionally observes per-table
//! progress. The engine returns a [`TransferReport`] with per-table row
//! counts, non-fatal warnings, and rename outcomes; rendering is the
//! caller's job.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::rename::RenameDirective;
use crate::rename::RenameOutcome;

// ============================================================================
// SECTION: Modes and Spec
// ============================================================================

/// Coarse table-set selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    /// Configuration tables: `settings`, `configs`, `caches`.
    #[default]
    Config,
    /// Metrics tables: `meters`, `sessions`, `grid_sessions`.
    Metrics,
    /// All known tables, configuration first.
    All,
}

/// Synchronous per-table progress observer: `(table, rows)`.
pub type ProgressObserver = Box<dyn Fn(&str, u64)>;

/// Configuration for a transfer, export, or import run.
#[derive(Default)]
pub struct TransferSpec {
    /// Coarse table-set mode; ignored when `tables` is non-empty.
    pub mode: TransferMode,
    /// Explicit table list; validated against the identifier grammar before
    /// use and always overriding `mode`.
    pub tables: Vec<String>,
    /// Preview-only execution: report effects without mutating anything.
    pub dry_run: bool,
    /// Optional observer invoked once per table after it completes.
    pub on_progress: Option<ProgressObserver>,
    /// Loadpoint rename directives, applied in order after table copies.
    pub loadpoint_renames: Vec<RenameDirective>,
    /// Vehicle rename directives, applied in order after table copies.
    pub vehicle_renames: Vec<RenameDirective>,
}

impl TransferSpec {
    /// Creates a spec for the given mode with everything else defaulted.
    #[must_use]
    pub fn new(mode: TransferMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Invokes the progress observer, if one is set.
    pub fn report_progress(&self, table: &str, rows: u64) {
        if let Some(observer) = &self.on_progress {
            observer(table, rows);
        }
    }
}

// ============================================================================
// SECTION: Report Model
// ============================================================================

/// Non-fatal condition surfaced during a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferWarning {
    /// Table exists in the source but not the destination; it was skipped.
    MissingTable {
        /// Skipped table name.
        table: String,
    },
    /// Column exists in the source but not the destination; its data was
    /// dropped for every copied row.
    SkippedColumn {
        /// Table holding the column.
        table: String,
        /// Skipped column name.
        column: String,
    },
}

/// Row count for one completed (or previewed) table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOutcome {
    /// Table name.
    pub table: String,
    /// Rows copied (real run) or rows that would be copied (dry run).
    pub rows: u64,
}

/// Outcome of one rename directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveOutcome {
    /// The directive that produced this outcome.
    pub directive: RenameDirective,
    /// Per-representation change counts.
    pub outcome: RenameOutcome,
}

/// Everything a transfer run did (or, in dry-run mode, would do).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReport {
    /// Whether this report came from a dry run.
    pub dry_run: bool,
    /// Per-table outcomes in resolution order.
    pub tables: Vec<TableOutcome>,
    /// Non-fatal warnings in encounter order.
    pub warnings: Vec<TransferWarning>,
    /// Loadpoint rename outcomes in directive order.
    pub loadpoint_renames: Vec<DirectiveOutcome>,
    /// Vehicle rename outcomes in directive order.
    pub vehicle_renames: Vec<DirectiveOutcome>,
}
