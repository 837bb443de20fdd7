// crates/chargedb-sqlite/src/rename.rs
// ============================================================================
// Module: chargedb Rename Engine
// Description: Multi-representation entity rename with a lock-step counting
//              mode, plus session deletion.
// Purpose: Rename a loadpoint or vehicle across relational columns,
//          settings key/value pairs, and serialized config blobs.
// Dependencies: chargedb-core, rusqlite, thiserror
// ============================================================================

//! ## Overview
//! A rename touches three representations inside one transaction per
//! directive:
//!
//! 1. the entity's `sessions` column,
//! 2. `settings` entries — loadpoints by value match under `lp%.title`
//!    keys, vehicles by migrating the `asset.<name>.` key prefix with values
//!    preserved verbatim,
//! 3. `configs` blobs restricted to the kind's discriminator class, via the
//!    shared title matcher (structured decode or text fallback).
//!
//! The counting mode walks the exact same code with `apply = false`: each
//! representation has one predicate, so dry-run counts cannot drift from
//! what a real run reports. A rename never changes the number of rows in
//! any table.

// ============================================================================
// SECTION: Imports
// ============================================================================

use chargedb_core::EntityKind;
use chargedb_core::RenameDirective;
use chargedb_core::RenameOutcome;
use chargedb_core::blob;
use chargedb_core::identifiers::LOADPOINT_TITLE_KEY_PATTERN;
use chargedb_core::identifiers::asset_key_prefix;
use rusqlite::Connection;
use rusqlite::params;
use thiserror::Error;

use crate::client::Client;
use crate::client::ClientError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Rename engine errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Any failure aborts and rolls back the current directive only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenameError {
    /// Statement execution failed.
    #[error("database error: {0}")]
    Db(String),
    /// Transaction begin or commit failed.
    #[error("transaction error: {0}")]
    Tx(String),
}

/// Maps a statement failure into a rename error.
fn db_err(err: &rusqlite::Error) -> RenameError {
    RenameError::Db(err.to_string())
}

// ============================================================================
// SECTION: Entry Points
// ============================================================================

impl Client {
    /// Renames an entity across all three representations.
    ///
    /// All updates for the directive run in one transaction; a failure at
    /// any step rolls the whole directive back.
    ///
    /// # Errors
    ///
    /// Returns [`RenameError`] on statement or transaction failure.
    pub fn rename_entity(
        &mut self,
        kind: EntityKind,
        directive: &RenameDirective,
    ) -> Result<RenameOutcome, RenameError> {
        let tx = self.transaction().map_err(|err| RenameError::Tx(err.to_string()))?;
        let outcome = rename_in(&tx, kind, directive, true)?;
        tx.commit().map_err(|err| RenameError::Tx(err.to_string()))?;
        Ok(outcome)
    }

    /// Reports what [`Client::rename_entity`] would change, without writing.
    ///
    /// For identical database state the returned counts equal the mutating
    /// mode's counts exactly; both modes share one predicate per
    /// representation.
    ///
    /// # Errors
    ///
    /// Returns [`RenameError`] on statement failure.
    pub fn rename_entity_dry_run(
        &self,
        kind: EntityKind,
        directive: &RenameDirective,
    ) -> Result<RenameOutcome, RenameError> {
        rename_in(self.conn(), kind, directive, false)
    }

    /// Deletes all sessions recorded for the named entity.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Db`] when the delete fails.
    pub fn delete_sessions_for(&self, kind: EntityKind, name: &str) -> Result<u64, ClientError> {
        let column = kind.session_column();
        let sql = format!("DELETE FROM sessions WHERE `{column}` = ?1");
        let affected = self
            .conn()
            .execute(&sql, params![name])
            .map_err(|err| ClientError::Db(err.to_string()))?;
        Ok(u64::try_from(affected).unwrap_or(u64::MAX))
    }

    /// Counts sessions recorded for the named entity.
    ///
    /// This doubles as the delete's dry-run value: the predicate is the
    /// same equality the delete uses.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Db`] when the count query fails.
    pub fn count_sessions_for(&self, kind: EntityKind, name: &str) -> Result<u64, ClientError> {
        let column = kind.session_column();
        let sql = format!("SELECT COUNT(*) FROM sessions WHERE `{column}` = ?1");
        let count: i64 = self
            .conn()
            .query_row(&sql, params![name], |row| row.get(0))
            .map_err(|err| ClientError::Db(err.to_string()))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

// ============================================================================
// SECTION: Shared Rename Path
// ============================================================================

/// Runs one rename directive against all three representations.
///
/// `apply = false` is the counting mode; it issues no writes.
fn rename_in(
    conn: &Connection,
    kind: EntityKind,
    directive: &RenameDirective,
    apply: bool,
) -> Result<RenameOutcome, RenameError> {
    let old = directive.old();
    let new = directive.new_name();
    let sessions = rename_sessions(conn, kind, old, new, apply)?;
    let settings = match kind {
        EntityKind::Loadpoint => rename_title_settings(conn, old, new, apply)?,
        EntityKind::Vehicle => migrate_asset_keys(conn, old, new, apply)?,
    };
    let configs = retitle_configs(conn, kind.config_class(), old, new, apply)?;
    Ok(RenameOutcome {
        sessions,
        settings,
        configs,
    })
}

/// Updates (or counts) the entity's column in the `sessions` table.
fn rename_sessions(
    conn: &Connection,
    kind: EntityKind,
    old: &str,
    new: &str,
    apply: bool,
) -> Result<u64, RenameError> {
    let column = kind.session_column();
    // One predicate for both modes; `?1` binds the old name.
    let predicate = format!("`{column}` = ?1");
    if apply {
        let sql = format!("UPDATE sessions SET `{column}` = ?2 WHERE {predicate}");
        let affected = conn.execute(&sql, params![old, new]).map_err(|err| db_err(&err))?;
        Ok(u64::try_from(affected).unwrap_or(u64::MAX))
    } else {
        let sql = format!("SELECT COUNT(*) FROM sessions WHERE {predicate}");
        let count: i64 =
            conn.query_row(&sql, params![old], |row| row.get(0)).map_err(|err| db_err(&err))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

/// Updates (or counts) loadpoint title values in the `settings` table.
///
/// Matches entries whose key fits the per-index title pattern and whose
/// value equals the old name; the key itself is untouched.
fn rename_title_settings(
    conn: &Connection,
    old: &str,
    new: &str,
    apply: bool,
) -> Result<u64, RenameError> {
    const PREDICATE: &str = "key LIKE ?1 AND value = ?2";
    if apply {
        let sql = format!("UPDATE settings SET value = ?3 WHERE {PREDICATE}");
        let affected = conn
            .execute(&sql, params![LOADPOINT_TITLE_KEY_PATTERN, old, new])
            .map_err(|err| db_err(&err))?;
        Ok(u64::try_from(affected).unwrap_or(u64::MAX))
    } else {
        let sql = format!("SELECT COUNT(*) FROM settings WHERE {PREDICATE}");
        let count: i64 = conn
            .query_row(&sql, params![LOADPOINT_TITLE_KEY_PATTERN, old], |row| row.get(0))
            .map_err(|err| db_err(&err))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

/// Migrates (or counts) vehicle settings keys from the old to the new
/// prefix.
///
/// The vehicle's identity is embedded in the key path, so this renames the
/// key itself: insert-or-replace under the new key, delete the old key, and
/// keep the stored value verbatim. Both modes enumerate the same key set.
fn migrate_asset_keys(
    conn: &Connection,
    old: &str,
    new: &str,
    apply: bool,
) -> Result<u64, RenameError> {
    let old_prefix = asset_key_prefix(old);
    let new_prefix = asset_key_prefix(new);

    let mut stmt = conn
        .prepare("SELECT key, value FROM settings WHERE key LIKE ?1")
        .map_err(|err| db_err(&err))?;
    let rows = stmt
        .query_map(params![format!("{old_prefix}%")], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(|err| db_err(&err))?;
    let mut entries = Vec::new();
    for row in rows {
        entries.push(row.map_err(|err| db_err(&err))?);
    }

    if apply {
        for (key, value) in &entries {
            let suffix = key.strip_prefix(&old_prefix).unwrap_or(key);
            let new_key = format!("{new_prefix}{suffix}");
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                params![new_key, value],
            )
            .map_err(|err| db_err(&err))?;
            conn.execute("DELETE FROM settings WHERE key = ?1", params![key])
                .map_err(|err| db_err(&err))?;
        }
    }
    Ok(u64::try_from(entries.len()).unwrap_or(u64::MAX))
}

/// Rewrites (or counts) config blob titles for one discriminator class.
///
/// Per-row matching is delegated entirely to [`blob::retitle`]; a row
/// counts exactly when `retitle` returns a rewritten blob, in both modes.
fn retitle_configs(
    conn: &Connection,
    class: i64,
    old: &str,
    new: &str,
    apply: bool,
) -> Result<u64, RenameError> {
    let mut stmt = conn
        .prepare("SELECT id, value FROM configs WHERE class = ?1")
        .map_err(|err| db_err(&err))?;
    let rows = stmt
        .query_map(params![class], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(|err| db_err(&err))?;
    let mut blobs = Vec::new();
    for row in rows {
        blobs.push(row.map_err(|err| db_err(&err))?);
    }

    let mut changed = 0_u64;
    for (id, value) in &blobs {
        let Some(rewritten) = blob::retitle(value, old, new) else {
            continue;
        };
        if apply {
            conn.execute("UPDATE configs SET value = ?1 WHERE id = ?2", params![rewritten, id])
                .map_err(|err| db_err(&err))?;
        }
        changed += 1;
    }
    Ok(changed)
}
