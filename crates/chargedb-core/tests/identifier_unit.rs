// crates/chargedb-core/tests/identifier_unit.rs
// ============================================================================
// Module: Identifier and Directive Unit Tests
// Description: Identifier grammar, entity-kind conventions, and directive
//              validation.
// Purpose: Validate the injection guard and the rename input invariants.
// ============================================================================

//! ## Overview
//! Unit and property tests for:
//! - the table-name grammar (accepts `[A-Za-z_][A-Za-z0-9_]*`, rejects
//!   statement-breaking characters)
//! - per-kind storage conventions
//! - rename directive trimming and non-empty validation

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use chargedb_core::EntityKind;
use chargedb_core::IdentifierError;
use chargedb_core::RenameDirective;
use chargedb_core::TableName;
use chargedb_core::identifiers::asset_key_prefix;
use chargedb_core::rename::DirectiveError;
use proptest::prelude::proptest;

// ============================================================================
// SECTION: Table Name Grammar
// ============================================================================

#[test]
fn plain_names_are_accepted() {
    for name in ["sessions", "grid_sessions", "_private", "t2", "A"] {
        assert!(TableName::parse(name).is_ok(), "expected \"{name}\" to parse");
    }
}

#[test]
fn statement_breaking_names_are_rejected() {
    for name in [
        "",
        "1sessions",
        "se ssions",
        "sessions;drop table settings",
        "sessions`--",
        "sessions'",
        "sessions\"",
        "sess-ions",
        "sessions\n",
    ] {
        assert_eq!(
            TableName::parse(name),
            Err(IdentifierError::Invalid(name.to_owned())),
            "expected \"{name}\" to be rejected"
        );
    }
}

#[test]
fn quoted_form_wraps_in_backticks() {
    let table = TableName::parse("sessions").unwrap();
    assert_eq!(table.quoted(), "`sessions`");
    assert_eq!(table.as_str(), "sessions");
}

proptest! {
    #[test]
    fn grammar_conforming_names_always_parse(name in "[A-Za-z_][A-Za-z0-9_]{0,30}") {
        assert!(TableName::parse(name.as_str()).is_ok());
    }

    #[test]
    fn names_with_forbidden_characters_never_parse(
        prefix in "[A-Za-z_][A-Za-z0-9_]{0,10}",
        bad in "[^A-Za-z0-9_]",
        suffix in "[A-Za-z0-9_]{0,10}",
    ) {
        let name = format!("{prefix}{bad}{suffix}");
        assert!(TableName::parse(name.as_str()).is_err());
    }
}

// ============================================================================
// SECTION: Entity Kind Conventions
// ============================================================================

#[test]
fn loadpoint_conventions() {
    assert_eq!(EntityKind::Loadpoint.session_column(), "loadpoint");
    assert_eq!(EntityKind::Loadpoint.config_class(), 5);
}

#[test]
fn vehicle_conventions() {
    assert_eq!(EntityKind::Vehicle.session_column(), "vehicle");
    assert_eq!(EntityKind::Vehicle.config_class(), 3);
    assert_eq!(asset_key_prefix("e-Golf"), "asset.e-Golf.");
}

// ============================================================================
// SECTION: Rename Directives
// ============================================================================

#[test]
fn directives_are_trimmed() {
    let directive = RenameDirective::new("  Garage ", " Carport\t").unwrap();
    assert_eq!(directive.old(), "Garage");
    assert_eq!(directive.new_name(), "Carport");
}

#[test]
fn blank_names_are_rejected() {
    assert_eq!(
        RenameDirective::new("   ", "Carport"),
        Err(DirectiveError::EmptyName {
            side: "old"
        })
    );
    assert_eq!(
        RenameDirective::new("Garage", "\t"),
        Err(DirectiveError::EmptyName {
            side: "new"
        })
    );
}
