// crates/chargedb-core/src/rename.rs
// ============================================================================
// Module: chargedb Rename Types
// Description: Rename directives and per-representation outcome counts.
// Purpose: Shared shapes for the counting and mutating rename paths.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`RenameDirective`] is an `(old, new)` pair validated at construction:
//! both sides must be non-empty after trimming. A [`RenameOutcome`] reports
//! how many rows changed in each of the three storage representations. The
//! dry-run contract requires the counting and mutating engines to produce
//! identical outcomes for identical database state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Rename directive validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    /// Old or new name is empty after trimming.
    #[error("rename directive has an empty {side} name")]
    EmptyName {
        /// Which side was empty: `"old"` or `"new"`.
        side: &'static str,
    },
}

// ============================================================================
// SECTION: Directives
// ============================================================================

/// A validated `(old, new)` rename pair.
///
/// # Invariants
/// - Both names are trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameDirective {
    /// Current entity name.
    old: String,
    /// Replacement entity name.
    new: String,
}

impl RenameDirective {
    /// Validates and trims an `(old, new)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError::EmptyName`] when either side is empty after
    /// trimming.
    pub fn new(old: impl AsRef<str>, new: impl AsRef<str>) -> Result<Self, DirectiveError> {
        let old = old.as_ref().trim();
        let new = new.as_ref().trim();
        if old.is_empty() {
            return Err(DirectiveError::EmptyName {
                side: "old",
            });
        }
        if new.is_empty() {
            return Err(DirectiveError::EmptyName {
                side: "new",
            });
        }
        Ok(Self {
            old: old.to_owned(),
            new: new.to_owned(),
        })
    }

    /// Returns the current entity name.
    #[must_use]
    pub fn old(&self) -> &str {
        &self.old
    }

    /// Returns the replacement entity name.
    #[must_use]
    pub fn new_name(&self) -> &str {
        &self.new
    }
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Per-representation change counts for one rename directive.
///
/// # Invariants
/// - Counting mode and mutating mode return identical values for identical
///   database state.
/// - A rename never changes the number of rows in any table; these counts
///   describe changed content, not created or deleted rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOutcome {
    /// Rows changed in the relational representation (`sessions`).
    pub sessions: u64,
    /// Entries changed in the key/value representation (`settings`).
    pub settings: u64,
    /// Blob rows changed in the serialized representation (`configs`).
    pub configs: u64,
}

impl RenameOutcome {
    /// Returns true when the directive would touch nothing.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.sessions == 0 && self.settings == 0 && self.configs == 0
    }
}
