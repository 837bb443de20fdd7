// crates/chargedb-sqlite/src/value.rs
// ============================================================================
// Module: chargedb Value Bridge
// Description: Conversions between SQLite cell values and JSON values.
// Purpose: Keep type conversion confined to the export/import boundary.
// Dependencies: rusqlite, serde_json
// ============================================================================

//! ## Overview
//! Cells travel through the engine as `rusqlite::types::Value`, the tagged
//! null/integer/real/text/blob variant. Conversion to and from JSON happens
//! only here, at the envelope boundary: everywhere else values are opaque.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::types::Value as SqlValue;
use serde_json::Number;
use serde_json::Value as JsonValue;

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Converts a SQLite cell into its JSON envelope form.
///
/// Blobs are normalized to text (lossy UTF-8); non-finite reals become
/// `null` since JSON cannot carry them.
pub(crate) fn sql_to_json(value: SqlValue) -> JsonValue {
    match value {
        SqlValue::Null => JsonValue::Null,
        SqlValue::Integer(integer) => JsonValue::Number(Number::from(integer)),
        SqlValue::Real(real) => Number::from_f64(real).map_or(JsonValue::Null, JsonValue::Number),
        SqlValue::Text(text) => JsonValue::String(text),
        SqlValue::Blob(bytes) => JsonValue::String(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Converts a JSON envelope value into a bindable SQLite cell.
///
/// Booleans map to 0/1; nested arrays and objects have no cell form and
/// become `NULL`.
pub(crate) fn json_to_sql(value: &JsonValue) -> SqlValue {
    match value {
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => SqlValue::Null,
        JsonValue::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        JsonValue::Number(number) => number.as_i64().map_or_else(
            || number.as_f64().map_or(SqlValue::Null, SqlValue::Real),
            SqlValue::Integer,
        ),
        JsonValue::String(text) => SqlValue::Text(text.clone()),
    }
}
