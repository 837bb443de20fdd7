// crates/chargedb-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and spec construction in the
//              CLI entry point.
// Purpose: Ensure rename pairs, mode mapping, and confirmation parsing behave
//          as the command dispatcher expects.
// Dependencies: chargedb-cli main helpers
// ============================================================================

//! ## Overview
//! Validates the pure helper layer of the CLI: `OLD=NEW` pair parsing, the
//! mode and kind argument mappings, affirmative-answer parsing, and transfer
//! spec assembly.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use chargedb_core::EntityKind;
use chargedb_core::TransferMode;

use super::KindArg;
use super::ModeArg;
use super::SelectionArgs;
use super::build_spec;
use super::is_affirmative;
use super::parse_pair;
use super::parse_pairs;

// ============================================================================
// SECTION: Pair Parsing
// ============================================================================

#[test]
fn parse_pair_splits_on_the_first_equals() {
    let directive = parse_pair("Garage=Carport").expect("valid pair");
    assert_eq!(directive.old(), "Garage");
    assert_eq!(directive.new_name(), "Carport");
}

#[test]
fn parse_pair_keeps_equals_in_the_new_name() {
    let directive = parse_pair("Old=New=Thing").expect("valid pair");
    assert_eq!(directive.old(), "Old");
    assert_eq!(directive.new_name(), "New=Thing");
}

#[test]
fn parse_pair_rejects_missing_separator() {
    assert!(parse_pair("GarageCarport").is_err());
}

#[test]
fn parse_pair_rejects_blank_sides() {
    assert!(parse_pair("=Carport").is_err());
    assert!(parse_pair("Garage=").is_err());
    assert!(parse_pair("Garage=   ").is_err());
}

#[test]
fn parse_pairs_collects_in_order() {
    let pairs = ["A=B".to_owned(), "C=D".to_owned()];
    let directives = parse_pairs(&pairs).expect("valid pairs");
    assert_eq!(directives.len(), 2);
    assert_eq!(directives[0].old(), "A");
    assert_eq!(directives[1].new_name(), "D");
}

// ============================================================================
// SECTION: Argument Mappings
// ============================================================================

#[test]
fn mode_arg_maps_onto_transfer_mode() {
    assert_eq!(TransferMode::from(ModeArg::Config), TransferMode::Config);
    assert_eq!(TransferMode::from(ModeArg::Metrics), TransferMode::Metrics);
    assert_eq!(TransferMode::from(ModeArg::All), TransferMode::All);
}

#[test]
fn kind_arg_maps_onto_entity_kind() {
    assert_eq!(EntityKind::from(KindArg::Loadpoint), EntityKind::Loadpoint);
    assert_eq!(EntityKind::from(KindArg::Vehicle), EntityKind::Vehicle);
}

#[test]
fn is_affirmative_accepts_y_and_yes_only() {
    assert!(is_affirmative("y"));
    assert!(is_affirmative("Y\n"));
    assert!(is_affirmative("  yes  "));
    assert!(!is_affirmative("n"));
    assert!(!is_affirmative(""));
    assert!(!is_affirmative("yep"));
}

// ============================================================================
// SECTION: Spec Assembly
// ============================================================================

#[test]
fn build_spec_carries_selection_and_flags() {
    let selection = SelectionArgs {
        mode: ModeArg::Metrics,
        tables: vec!["sessions".to_owned()],
    };
    let spec = build_spec(&selection, true, false, Vec::new(), Vec::new());
    assert_eq!(spec.mode, TransferMode::Metrics);
    assert_eq!(spec.tables, vec!["sessions".to_owned()]);
    assert!(spec.dry_run);
    assert!(spec.on_progress.is_none());
}

#[test]
fn build_spec_installs_a_progress_observer_when_verbose() {
    let selection = SelectionArgs {
        mode: ModeArg::Config,
        tables: Vec::new(),
    };
    let spec = build_spec(&selection, false, true, Vec::new(), Vec::new());
    assert!(spec.on_progress.is_some());
}
