//! Codec Tests
//!
//! Tests verify:
//! - Encoding of structured values
//! - Decoding of stored text, with failures mapped to None
//! - Decoding of raw engine cells of every storage class

use docstore::codec::{decode, decode_cell, encode};
use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Note {
    title: String,
    pinned: bool,
}

// =============================================================================
// Encode Tests
// =============================================================================

#[test]
fn test_encode_object() {
    let text = encode(&json!({"a": 1, "b": [true, null]})).unwrap();

    assert_eq!(decode::<Value>(&text), Some(json!({"a": 1, "b": [true, null]})));
}

#[test]
fn test_encode_typed_struct() {
    let note = Note {
        title: "groceries".to_string(),
        pinned: true,
    };

    let text = encode(&note).unwrap();

    assert_eq!(text, r#"{"title":"groceries","pinned":true}"#);
}

#[test]
fn test_encode_map_with_non_string_keys_fails() {
    let mut map = std::collections::HashMap::new();
    map.insert(vec![1u8], "x");

    assert_eq!(encode(&map), None);
}

// =============================================================================
// Decode Tests
// =============================================================================

#[test]
fn test_decode_valid_json() {
    assert_eq!(decode::<Value>("[1, 2, 3]"), Some(json!([1, 2, 3])));
    assert_eq!(decode::<Value>("\"text\""), Some(json!("text")));
    assert_eq!(decode::<Value>("null"), Some(Value::Null));
}

#[test]
fn test_decode_invalid_json_is_none() {
    assert_eq!(decode::<Value>("{not json"), None);
    assert_eq!(decode::<Value>(""), None);
}

#[test]
fn test_decode_into_typed_struct() {
    let note: Option<Note> = decode(r#"{"title":"a","pinned":false}"#);

    assert_eq!(
        note,
        Some(Note {
            title: "a".to_string(),
            pinned: false
        })
    );
}

#[test]
fn test_decode_shape_mismatch_is_none() {
    let note: Option<Note> = decode(r#"{"title":1}"#);

    assert_eq!(note, None);
}

// =============================================================================
// Cell Decode Tests
// =============================================================================

#[test]
fn test_decode_cell_text() {
    assert_eq!(decode_cell(ValueRef::Text(b"{\"k\":\"v\"}")), Some(json!({"k": "v"})));
}

#[test]
fn test_decode_cell_null_is_none() {
    assert_eq!(decode_cell(ValueRef::Null), None);
}

#[test]
fn test_decode_cell_numbers() {
    assert_eq!(decode_cell(ValueRef::Integer(42)), Some(json!(42)));
    assert_eq!(decode_cell(ValueRef::Real(1.5)), Some(json!(1.5)));
}

#[test]
fn test_decode_cell_blob() {
    assert_eq!(decode_cell(ValueRef::Blob(b"[1]")), Some(json!([1])));
    assert_eq!(decode_cell(ValueRef::Blob(&[0xff, 0xfe])), None);
}

#[test]
fn test_decode_cell_invalid_text_is_none() {
    assert_eq!(decode_cell(ValueRef::Text(b"plain words")), None);
}
