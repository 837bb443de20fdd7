// crates/chargedb-core/src/schema.rs
// ============================================================================
// Module: chargedb Column Model
// Description: Column metadata and name-based column reconciliation.
// Purpose: Make heterogeneous-schema copies safe by restricting them to the
//          columns both sides share.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Column metadata as reported by `PRAGMA table_info`, plus the pure
//! reconciliation functions the row copier is built on. Reconciliation is by
//! name only: declared types are carried for diagnostics but never used for
//! coercion.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Column Metadata
// ============================================================================

/// Metadata for a single table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared type string (informational only).
    pub decl_type: String,
    /// Whether the column carries a NOT NULL constraint.
    pub not_null: bool,
    /// Default value literal, when declared.
    pub default_value: Option<String>,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
}

// ============================================================================
// SECTION: Reconciliation
// ============================================================================

/// Returns the columns present by name on both sides, in source order.
///
/// Deterministic and O(n+m): destination names go into a set, then the
/// source list is filtered against it.
#[must_use]
pub fn reconcile(src: &[Column], dst: &[Column]) -> Vec<Column> {
    let dst_names: HashSet<&str> = dst.iter().map(|col| col.name.as_str()).collect();
    src.iter().filter(|col| dst_names.contains(col.name.as_str())).cloned().collect()
}

/// Returns the source columns absent from the destination, in source order.
///
/// These columns are skipped by a copy; callers surface them as warnings.
#[must_use]
pub fn source_only(src: &[Column], dst: &[Column]) -> Vec<Column> {
    let dst_names: HashSet<&str> = dst.iter().map(|col| col.name.as_str()).collect();
    src.iter().filter(|col| !dst_names.contains(col.name.as_str())).cloned().collect()
}
