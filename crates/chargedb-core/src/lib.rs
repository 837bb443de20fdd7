// crates/chargedb-core/src/lib.rs
// ============================================================================
// Module: chargedb Core
// Description: Pure domain types and logic for database transfer and rename.
// Purpose: Keep everything that does not touch a connection in one
//          dependency-free crate so predicates stay independently testable.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Core types for the chargedb transfer and rename engine. This crate holds
//! the validated identifier grammar, the column reconciliation logic, the
//! transfer specification and report model, and the serialized-blob title
//! matcher. Nothing in here opens a database: the `chargedb-sqlite` crate
//! layers connection handling and statement execution on top.
//!
//! Security posture: table names arrive from untrusted input (CLI flags,
//! import envelopes) and are interpolated into statement text. They must pass
//! through [`TableName`] before any statement is built.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod blob;
pub mod identifiers;
pub mod rename;
pub mod schema;
pub mod transfer;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use identifiers::EntityKind;
pub use identifiers::IdentifierError;
pub use identifiers::TableName;
pub use rename::DirectiveError;
pub use rename::RenameDirective;
pub use rename::RenameOutcome;
pub use schema::Column;
pub use schema::reconcile;
pub use schema::source_only;
pub use transfer::DirectiveOutcome;
pub use transfer::ProgressObserver;
pub use transfer::TableOutcome;
pub use transfer::TransferMode;
pub use transfer::TransferReport;
pub use transfer::TransferSpec;
pub use transfer::TransferWarning;
