//! Document codec
//!
//! Converts documents to and from the JSON text stored in the `data`
//! column. Both directions are best-effort: a failure is reported as
//! `None`, never as an error.

use rusqlite::types::ValueRef;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Render a value as JSON text for storage
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!("Failed to encode document: {}", e);
            None
        }
    }
}

/// Parse stored JSON text back into a value
pub fn decode<T: DeserializeOwned>(text: &str) -> Option<T> {
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::trace!("Failed to decode document: {}", e);
            None
        }
    }
}

/// Decode a raw engine cell
///
/// TEXT is parsed directly. Numeric cells are parsed from their textual
/// form, so a bare `42` written through `execute` still reads back as a
/// number. BLOBs are parsed when they hold UTF-8. NULL is absent.
pub fn decode_cell(cell: ValueRef<'_>) -> Option<Value> {
    match cell {
        ValueRef::Null => None,
        ValueRef::Integer(i) => decode(&i.to_string()),
        ValueRef::Real(f) => decode(&f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            let text = std::str::from_utf8(bytes).ok()?;
            decode(text)
        }
    }
}
