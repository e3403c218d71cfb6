//! Lenient decoding of stored tile settings
//!
//! Stored values may be stale, hand-edited or written by older releases.
//! Decoding never fails: unusable parts are skipped and reconciliation
//! fills in the rest.

use serde_json::Value;
use tracing::warn;

use super::TileSettings;

/// Decode a stored JSON value; `None` when nothing usable is present
pub fn decode_stored(value: &Value) -> Option<TileSettings> {
    let Value::Object(map) = value else {
        if !value.is_null() {
            warn!(kind = json_kind(value), "Stored tile settings are not an object, using defaults");
        }
        return None;
    };

    let mut settings = TileSettings::default();
    let mut skipped = 0usize;

    match map.get("order") {
        Some(Value::Array(entries)) => {
            for entry in entries {
                match entry {
                    Value::String(id) => settings.order.push(id.clone()),
                    _ => skipped += 1,
                }
            }
        }
        Some(Value::Null) | None => {}
        Some(other) => {
            warn!(kind = json_kind(other), "Stored tile order is not an array, ignoring it");
        }
    }

    match map.get("visible") {
        Some(Value::Object(entries)) => {
            for (id, flag) in entries {
                match flag {
                    Value::Bool(visible) => {
                        settings.visible.insert(id.clone(), *visible);
                    }
                    _ => skipped += 1,
                }
            }
        }
        Some(Value::Null) | None => {}
        Some(other) => {
            warn!(kind = json_kind(other), "Stored tile visibility is not an object, ignoring it");
        }
    }

    if skipped > 0 {
        warn!(skipped, "Skipped malformed entries in stored tile settings");
    }

    Some(settings)
}

/// Decode stored JSON text; malformed text is treated as absent
pub fn decode_stored_str(text: &str) -> Option<TileSettings> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => decode_stored(&value),
        Err(err) => {
            warn!(error = %err, "Stored tile settings are not valid JSON, using defaults");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::reconcile;
    use serde_json::json;

    #[test]
    fn test_decode_complete_value() {
        let decoded = decode_stored(&json!({
            "order": ["weight", "feeding"],
            "visible": {"feeding": false}
        }))
        .unwrap();
        assert_eq!(decoded.order, vec!["weight", "feeding"]);
        assert!(!decoded.is_visible("feeding"));
    }

    #[test]
    fn test_decode_missing_fields() {
        let decoded = decode_stored(&json!({})).unwrap();
        assert!(decoded.order.is_empty());
        assert!(decoded.visible.is_empty());

        let repaired = reconcile(Some(&decoded), &["A", "B"]);
        assert_eq!(repaired.order, vec!["A", "B"]);
    }

    #[test]
    fn test_decode_skips_garbage_entries() {
        let decoded = decode_stored(&json!({
            "order": ["A", 7, null, "B"],
            "visible": {"A": "no", "B": false}
        }))
        .unwrap();
        assert_eq!(decoded.order, vec!["A", "B"]);
        assert_eq!(decoded.visible.len(), 1);
        assert!(!decoded.is_visible("B"));
    }

    #[test]
    fn test_decode_wrong_shapes() {
        assert!(decode_stored(&json!(null)).is_none());
        assert!(decode_stored(&json!([1, 2])).is_none());

        let decoded = decode_stored(&json!({"order": "A,B", "visible": []})).unwrap();
        assert!(decoded.order.is_empty());
        assert!(decoded.visible.is_empty());
    }

    #[test]
    fn test_decode_str_malformed() {
        assert!(decode_stored_str("{not json").is_none());
        assert!(decode_stored_str("").is_none());
        assert_eq!(
            decode_stored_str(r#"{"order":["A"]}"#).map(|s| s.order),
            Some(vec!["A".to_string()])
        );
    }
}
