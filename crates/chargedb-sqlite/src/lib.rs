// crates/chargedb-sqlite/src/lib.rs
// ============================================================================
// Module: chargedb SQLite Engine
// Description: Synchronous SQLite engine for transfer, rename, and the JSON
//              export/import envelope.
// Purpose: Bind the pure chargedb-core logic to rusqlite statement execution.
// Dependencies: chargedb-core, rusqlite, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Blocking, single-threaded SQLite engine built on `rusqlite`:
//!
//! - [`Client`] — owned connection handle with schema inspection.
//! - [`transfer`] — schema-reconciling table copy with dry-run previews and
//!   post-commit entity renames.
//! - [`Client::rename_entity`] / [`Client::rename_entity_dry_run`] — the
//!   multi-representation rename engine; both modes share one predicate per
//!   representation so previews report exactly what a real run would do.
//! - [`Client::export_json`] / [`Client::import_json`] — flat JSON envelope
//!   backup and restore.
//!
//! The engine assumes exclusive access to both database files for the
//! duration of a run; the owning application must not be writing
//! concurrently. No state is persisted beyond the databases themselves.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod export;
pub mod import;
pub mod rename;
pub mod transfer;
mod value;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use client::CONFIG_TABLES;
pub use client::Client;
pub use client::ClientError;
pub use client::METRICS_TABLES;
pub use client::resolve_tables;
pub use export::EXPORT_FORMAT_VERSION;
pub use export::ExportEnvelope;
pub use export::ExportError;
pub use export::ExportReport;
pub use import::ImportError;
pub use import::ImportReport;
pub use rename::RenameError;
pub use transfer::TableCopy;
pub use transfer::TransferError;
pub use transfer::copy_table_tx;
pub use transfer::transfer;
