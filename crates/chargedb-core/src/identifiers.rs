// crates/chargedb-core/src/identifiers.rs
// ============================================================================
// Module: chargedb Identifiers
// Description: Validated SQL identifiers and renamable entity kinds.
// Purpose: Reject statement-breaking names before any SQL text is built.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Table names are interpolated into statement text (quoted identifiers
//! cannot be bound as parameters), so every name that originates outside the
//! crate must pass the identifier grammar first: an ASCII letter or
//! underscore followed by ASCII letters, digits, or underscores. [`TableName`]
//! is the only way to obtain an interpolatable name.
//!
//! [`EntityKind`] enumerates the two renamable categories and carries each
//! kind's storage conventions: the `sessions` column, the `settings`
//! key convention, and the `configs` discriminator class.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier validation errors.
///
/// # Invariants
/// - Raised before any statement text is built from the offending name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// Name fails the identifier grammar.
    #[error("invalid identifier: \"{0}\"")]
    Invalid(String),
}

// ============================================================================
// SECTION: Table Names
// ============================================================================

/// A table name that passed the identifier grammar.
///
/// # Invariants
/// - Matches `[A-Za-z_][A-Za-z0-9_]*`; safe to interpolate into statement
///   text when backtick-quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    /// Validates a raw name against the identifier grammar.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::Invalid`] when the name is empty, starts
    /// with a digit, or contains anything outside letters, digits, and
    /// underscores.
    pub fn parse(raw: impl Into<String>) -> Result<Self, IdentifierError> {
        let raw = raw.into();
        if is_valid_identifier(&raw) {
            Ok(Self(raw))
        } else {
            Err(IdentifierError::Invalid(raw))
        }
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the name backtick-quoted for statement interpolation.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Checks a string against the identifier grammar.
#[must_use]
pub fn is_valid_identifier(raw: &str) -> bool {
    let mut chars = raw.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ============================================================================
// SECTION: Entity Kinds
// ============================================================================

/// Key pattern selecting per-loadpoint title entries in `settings`.
pub const LOADPOINT_TITLE_KEY_PATTERN: &str = "lp%.title";

/// The two renamable entity categories.
///
/// # Invariants
/// - Storage conventions (column, settings convention, config class) are
///   fixed per kind and shared by the counting and mutating rename paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Fixed charging location.
    Loadpoint,
    /// Mobile asset (vehicle).
    Vehicle,
}

impl EntityKind {
    /// Returns the `sessions` column holding this kind's name.
    #[must_use]
    pub const fn session_column(self) -> &'static str {
        match self {
            Self::Loadpoint => "loadpoint",
            Self::Vehicle => "vehicle",
        }
    }

    /// Returns the `configs.class` discriminator for this kind's blobs.
    #[must_use]
    pub const fn config_class(self) -> i64 {
        match self {
            Self::Loadpoint => 5,
            Self::Vehicle => 3,
        }
    }

    /// Returns the kind's stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loadpoint => "loadpoint",
            Self::Vehicle => "vehicle",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the dotted `settings` key prefix embedding a vehicle's identity.
///
/// Vehicle settings live under `asset.<name>.`; renaming a vehicle migrates
/// the key itself rather than matching the value.
#[must_use]
pub fn asset_key_prefix(name: &str) -> String {
    format!("asset.{name}.")
}
