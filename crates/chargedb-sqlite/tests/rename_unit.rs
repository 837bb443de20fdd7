// crates/chargedb-sqlite/tests/rename_unit.rs
// ============================================================================
// Module: Rename Engine Unit Tests
// Description: Multi-representation rename, counting-mode parity, and
//              session deletion.
// Purpose: Validate that previews report exactly what real runs do and that
//          renames touch content, never row counts.
// ============================================================================

//! ## Overview
//! Integration tests for the rename engine against a seeded database:
//! - loadpoint renames across sessions, settings values, and config blobs
//! - vehicle renames across sessions, asset key prefixes, and both blob
//!   branches (structured JSON and flat text)
//! - dry-run/real-run count parity and dry-run read-only behavior
//! - idempotence and reversal
//! - session deletion and its count mirror

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;
use std::path::PathBuf;

use chargedb_core::EntityKind;
use chargedb_core::RenameDirective;
use chargedb_core::RenameOutcome;
use chargedb_sqlite::Client;
use rusqlite::Connection;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const SCHEMA: &str = "
    CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT);
    CREATE TABLE configs (id INTEGER PRIMARY KEY, class INTEGER, type TEXT, value TEXT);
    CREATE TABLE sessions (
        id INTEGER PRIMARY KEY,
        created DATETIME,
        loadpoint TEXT,
        vehicle TEXT,
        charged_kwh REAL
    );
";

const SAMPLE_DATA: &str = "
    INSERT INTO settings (key, value) VALUES
        ('lp1.title', 'Garage'),
        ('lp1.mode', 'pv'),
        ('lp2.title', 'eBikes'),
        ('asset.e-Golf.minLevel', '25'),
        ('asset.e-Golf.limitLevel', '90'),
        ('asset.e-Golf.planLevel', '0');

    INSERT INTO configs (id, class, type, value) VALUES
        (1, 5, 'template', '{\"title\":\"Garage\",\"charger\":\"db:1\"}'),
        (2, 3, 'template', '{\"title\":\"e-Golf\",\"type\":\"vw\"}'),
        (3, 3, 'custom', 'title: e-Golf' || char(10) || 'type: offline');

    INSERT INTO sessions (id, created, loadpoint, vehicle) VALUES
        (1, '2023-04-01 10:00:00', 'Garage', 'e-Golf'),
        (2, '2023-04-02 10:00:00', 'Garage', 'e-Golf'),
        (3, '2023-04-03 10:00:00', 'Garage', NULL),
        (4, '2023-04-04 10:00:00', 'eBikes', 'e-Bike'),
        (5, '2023-04-05 10:00:00', 'eBikes', NULL);
";

fn seeded_db(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("chargedb-test.db");
    let conn = Connection::open(&path).expect("open fixture db");
    conn.execute_batch(SCHEMA).expect("create schema");
    conn.execute_batch(SAMPLE_DATA).expect("seed data");
    path
}

fn count(path: &Path, sql: &str) -> i64 {
    let conn = Connection::open(path).expect("open for assert");
    conn.query_row(sql, [], |row| row.get(0)).expect("count query")
}

fn one_text(path: &Path, sql: &str) -> String {
    let conn = Connection::open(path).expect("open for assert");
    conn.query_row(sql, [], |row| row.get(0)).expect("text query")
}

fn directive(old: &str, new: &str) -> RenameDirective {
    RenameDirective::new(old, new).expect("valid directive")
}

// ============================================================================
// SECTION: Loadpoint Renames
// ============================================================================

#[test]
fn loadpoint_rename_touches_all_three_representations() {
    let dir = TempDir::new().expect("tempdir");
    let path = seeded_db(&dir);
    let mut client = Client::open(&path).expect("open client");

    let outcome = client
        .rename_entity(EntityKind::Loadpoint, &directive("Garage", "Carport"))
        .expect("rename");
    assert_eq!(outcome, RenameOutcome {
        sessions: 3,
        settings: 1,
        configs: 1,
    });

    assert_eq!(count(&path, "SELECT COUNT(*) FROM sessions WHERE loadpoint = 'Garage'"), 0);
    assert_eq!(count(&path, "SELECT COUNT(*) FROM sessions WHERE loadpoint = 'Carport'"), 3);
    assert_eq!(one_text(&path, "SELECT value FROM settings WHERE key = 'lp1.title'"), "Carport");
    // Untouched sibling entries stay as they were.
    assert_eq!(one_text(&path, "SELECT value FROM settings WHERE key = 'lp2.title'"), "eBikes");
    assert_eq!(one_text(&path, "SELECT value FROM settings WHERE key = 'lp1.mode'"), "pv");
    let blob = one_text(&path, "SELECT value FROM configs WHERE id = 1");
    let decoded: serde_json::Value = serde_json::from_str(&blob).expect("config blob stays json");
    assert_eq!(decoded["title"], "Carport");
    assert_eq!(decoded["charger"], "db:1");
}

#[test]
fn loadpoint_rename_never_changes_row_counts() {
    let dir = TempDir::new().expect("tempdir");
    let path = seeded_db(&dir);
    let mut client = Client::open(&path).expect("open client");

    client
        .rename_entity(EntityKind::Loadpoint, &directive("Garage", "Carport"))
        .expect("rename");

    assert_eq!(count(&path, "SELECT COUNT(*) FROM sessions"), 5);
    assert_eq!(count(&path, "SELECT COUNT(*) FROM settings"), 6);
    assert_eq!(count(&path, "SELECT COUNT(*) FROM configs"), 3);
}

// ============================================================================
// SECTION: Vehicle Renames
// ============================================================================

#[test]
fn vehicle_rename_migrates_asset_keys_preserving_values() {
    let dir = TempDir::new().expect("tempdir");
    let path = seeded_db(&dir);
    let mut client = Client::open(&path).expect("open client");

    let outcome = client
        .rename_entity(EntityKind::Vehicle, &directive("e-Golf", "ID.4"))
        .expect("rename");
    assert_eq!(outcome, RenameOutcome {
        sessions: 2,
        settings: 3,
        configs: 2,
    });

    assert_eq!(
        count(&path, "SELECT COUNT(*) FROM settings WHERE key LIKE 'asset.e-Golf.%'"),
        0
    );
    assert_eq!(
        one_text(&path, "SELECT value FROM settings WHERE key = 'asset.ID.4.minLevel'"),
        "25"
    );
    assert_eq!(
        one_text(&path, "SELECT value FROM settings WHERE key = 'asset.ID.4.limitLevel'"),
        "90"
    );
    assert_eq!(count(&path, "SELECT COUNT(*) FROM sessions WHERE vehicle = 'ID.4'"), 2);
}

#[test]
fn vehicle_rename_rewrites_text_blob_via_fallback() {
    let dir = TempDir::new().expect("tempdir");
    let path = seeded_db(&dir);
    let mut client = Client::open(&path).expect("open client");

    client.rename_entity(EntityKind::Vehicle, &directive("e-Golf", "ID.4")).expect("rename");

    let text_blob = one_text(&path, "SELECT value FROM configs WHERE id = 3");
    assert_eq!(text_blob, "title: ID.4\ntype: offline");
    let json_blob = one_text(&path, "SELECT value FROM configs WHERE id = 2");
    let decoded: serde_json::Value = serde_json::from_str(&json_blob).expect("valid json");
    assert_eq!(decoded["title"], "ID.4");
    assert_eq!(decoded["type"], "vw");
}

// ============================================================================
// SECTION: Counting-Mode Parity
// ============================================================================

#[test]
fn dry_run_matches_real_run_for_both_kinds() {
    let dir = TempDir::new().expect("tempdir");
    let path = seeded_db(&dir);
    let mut client = Client::open(&path).expect("open client");

    let loadpoint = directive("Garage", "Carport");
    let vehicle = directive("e-Golf", "ID.4");

    let loadpoint_preview = client
        .rename_entity_dry_run(EntityKind::Loadpoint, &loadpoint)
        .expect("loadpoint preview");
    let vehicle_preview =
        client.rename_entity_dry_run(EntityKind::Vehicle, &vehicle).expect("vehicle preview");

    let loadpoint_real =
        client.rename_entity(EntityKind::Loadpoint, &loadpoint).expect("loadpoint rename");
    let vehicle_real =
        client.rename_entity(EntityKind::Vehicle, &vehicle).expect("vehicle rename");

    assert_eq!(loadpoint_preview, loadpoint_real);
    assert_eq!(vehicle_preview, vehicle_real);
}

#[test]
fn dry_run_mutates_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let path = seeded_db(&dir);
    let client = Client::open(&path).expect("open client");

    client
        .rename_entity_dry_run(EntityKind::Vehicle, &directive("e-Golf", "ID.4"))
        .expect("preview");

    assert_eq!(count(&path, "SELECT COUNT(*) FROM sessions WHERE vehicle = 'e-Golf'"), 2);
    assert_eq!(
        count(&path, "SELECT COUNT(*) FROM settings WHERE key LIKE 'asset.e-Golf.%'"),
        3
    );
    assert_eq!(one_text(&path, "SELECT value FROM configs WHERE id = 3"), "title: e-Golf\ntype: offline");
}

#[test]
fn second_application_is_a_no_op_and_swap_back_restores() {
    let dir = TempDir::new().expect("tempdir");
    let path = seeded_db(&dir);
    let mut client = Client::open(&path).expect("open client");

    let first = client
        .rename_entity(EntityKind::Loadpoint, &directive("Garage", "Carport"))
        .expect("first rename");
    assert!(!first.is_empty());

    let second = client
        .rename_entity(EntityKind::Loadpoint, &directive("Garage", "Carport"))
        .expect("second rename");
    assert_eq!(second, RenameOutcome::default());

    let reverted = client
        .rename_entity(EntityKind::Loadpoint, &directive("Carport", "Garage"))
        .expect("reverting rename");
    assert_eq!(reverted.sessions, first.sessions);
    assert_eq!(reverted.settings, first.settings);
    assert_eq!(reverted.configs, first.configs);
    assert_eq!(count(&path, "SELECT COUNT(*) FROM sessions WHERE loadpoint = 'Garage'"), 3);
    assert_eq!(one_text(&path, "SELECT value FROM settings WHERE key = 'lp1.title'"), "Garage");
}

#[test]
fn unmatched_name_yields_zero_outcome_without_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = seeded_db(&dir);
    let mut client = Client::open(&path).expect("open client");

    let preview = client
        .rename_entity_dry_run(EntityKind::Vehicle, &directive("Phantom", "Ghost"))
        .expect("preview");
    assert_eq!(preview, RenameOutcome::default());

    let outcome = client
        .rename_entity(EntityKind::Vehicle, &directive("Phantom", "Ghost"))
        .expect("rename");
    assert_eq!(outcome, RenameOutcome::default());
}

// ============================================================================
// SECTION: Session Deletion
// ============================================================================

#[test]
fn delete_sessions_matches_its_count_mirror() {
    let dir = TempDir::new().expect("tempdir");
    let path = seeded_db(&dir);
    let client = Client::open(&path).expect("open client");

    let expected = client.count_sessions_for(EntityKind::Loadpoint, "Garage").expect("count");
    assert_eq!(expected, 3);

    let deleted = client.delete_sessions_for(EntityKind::Loadpoint, "Garage").expect("delete");
    assert_eq!(deleted, expected);
    assert_eq!(count(&path, "SELECT COUNT(*) FROM sessions"), 2);
    assert_eq!(client.count_sessions_for(EntityKind::Loadpoint, "Garage").expect("recount"), 0);
}

#[test]
fn delete_sessions_for_vehicle_only_touches_matching_rows() {
    let dir = TempDir::new().expect("tempdir");
    let path = seeded_db(&dir);
    let client = Client::open(&path).expect("open client");

    let deleted = client.delete_sessions_for(EntityKind::Vehicle, "e-Golf").expect("delete");
    assert_eq!(deleted, 2);
    assert_eq!(count(&path, "SELECT COUNT(*) FROM sessions"), 3);
    assert_eq!(count(&path, "SELECT COUNT(*) FROM sessions WHERE loadpoint = 'eBikes'"), 2);
}
