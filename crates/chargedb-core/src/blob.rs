// crates/chargedb-core/src/blob.rs
// ============================================================================
// Module: chargedb Blob Title Matcher
// Description: Decode-or-fallback title handling for serialized config blobs.
// Purpose: One shared predicate for the counting and mutating rename paths.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Config blobs are either machine-generated JSON objects or human-authored
//! flat text with a `title: <name>` line. Structured decoding takes
//! precedence; decode failure is not an error but the designed trigger for
//! the literal text fallback. A structured blob whose `title` attribute is
//! absent or non-string has no title and is skipped.
//!
//! [`retitle`] is the single source of truth for "would this blob change":
//! the mutating engine writes the returned blob, the counting engine counts
//! `Some` results. Keeping both modes on this one function is what holds
//! dry-run counts in lock-step with real mutations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Attempts structured decoding of a blob into a JSON object map.
///
/// Anything that is not a JSON object (including valid JSON scalars and
/// arrays) falls back to text handling.
fn decode_map(blob: &str) -> Option<Map<String, Value>> {
    serde_json::from_str::<Map<String, Value>>(blob).ok()
}

/// Finds the byte span of the title text in a flat-text blob.
///
/// The span covers the characters after `title: ` up to the end of the line.
fn text_title_span(blob: &str) -> Option<(usize, usize)> {
    let start = blob.find(TITLE_PREFIX)? + TITLE_PREFIX.len();
    let end = blob[start ..].find('\n').map_or(blob.len(), |offset| start + offset);
    Some((start, end))
}

/// Literal marker preceding a title in flat-text blobs.
const TITLE_PREFIX: &str = "title: ";

// ============================================================================
// SECTION: Title Primitives
// ============================================================================

/// Reads the title attribute of a blob, if it has one.
///
/// Structured branch: the `title` attribute when present and a string.
/// Text branch: the remainder of the first `title: ` line.
#[must_use]
pub fn read_title(blob: &str) -> Option<String> {
    match decode_map(blob) {
        Some(map) => map.get("title").and_then(Value::as_str).map(str::to_owned),
        None => {
            let (start, end) = text_title_span(blob)?;
            Some(blob[start .. end].trim_end_matches('\r').to_owned())
        }
    }
}

/// Rewrites a blob's title attribute, preserving every other field.
///
/// Returns `None` when the blob has no title to rewrite.
#[must_use]
pub fn write_title(blob: &str, new_title: &str) -> Option<String> {
    match decode_map(blob) {
        Some(mut map) => {
            map.get("title").and_then(Value::as_str)?;
            map.insert("title".to_owned(), Value::String(new_title.to_owned()));
            serde_json::to_string(&map).ok()
        }
        None => {
            let (start, end) = text_title_span(blob)?;
            let mut rewritten = String::with_capacity(blob.len());
            rewritten.push_str(&blob[.. start]);
            rewritten.push_str(new_title);
            rewritten.push_str(&blob[end ..]);
            Some(rewritten)
        }
    }
}

// ============================================================================
// SECTION: Shared Rename Predicate
// ============================================================================

/// Returns the rewritten blob when its title matches `old`, `None` otherwise.
///
/// Structured branch: the decoded `title` attribute must equal `old` exactly;
/// absent or non-string titles never match. Text branch: the literal pattern
/// `title: <old>` is replaced at its first occurrence only.
#[must_use]
pub fn retitle(blob: &str, old: &str, new: &str) -> Option<String> {
    match decode_map(blob) {
        Some(mut map) => {
            let title = map.get("title").and_then(Value::as_str)?;
            if title != old {
                return None;
            }
            map.insert("title".to_owned(), Value::String(new.to_owned()));
            serde_json::to_string(&map).ok()
        }
        None => {
            let old_pattern = format!("{TITLE_PREFIX}{old}");
            if blob.contains(&old_pattern) {
                let new_pattern = format!("{TITLE_PREFIX}{new}");
                Some(blob.replacen(&old_pattern, &new_pattern, 1))
            } else {
                None
            }
        }
    }
}
