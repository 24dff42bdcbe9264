//! # Document Extractor
//!
//! Pulls an embedded JSON document out of an optional raw string field.
//! Absence (a missing field, an empty or whitespace-only string, or an
//! explicit JSON `null`) is not an error; it simply yields no document.
//! Malformed JSON is an error attributed to the named field.

use serde_json::Value;

use shred_core::ShredError;

/// Extract and parse an embedded JSON field.
///
/// `field` names the input position for error attribution. Returns
/// `Ok(None)` when the field is absent, `Ok(Some(value))` on a successful
/// parse, and a single [`ShredError`] carrying the syntax detail when the
/// string is present but unparseable. Never panics.
pub fn extract_json_field(field: &str, raw: Option<&str>) -> Result<Option<Value>, ShredError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(ShredError::new(field, format!("invalid JSON: {e}"))),
    }
}
