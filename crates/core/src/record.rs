//! Core record type for the SEA MASTER record store.
//!
//! A `Record` is an open-ended JSON object; field names and values are opaque
//! to the store. Conventional fields (`id`, a status-like field, creator and
//! editor stamps) are only interpreted by search and the stats endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single schema-less dashboard record.
///
/// Serializes transparently as the underlying JSON object, so datasets
/// round-trip byte-for-byte in field content and order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    /// True if any field's string form contains `needle`.
    ///
    /// `needle` must already be lowercased; matching is case-insensitive on
    /// the field side.
    pub fn matches(&self, needle: &str) -> bool {
        self.0
            .values()
            .any(|v| field_text(v).to_lowercase().contains(needle))
    }

    /// Name of the conventional status field, if the record carries one.
    /// Matched by field name, case-insensitively.
    pub fn status_key(&self) -> Option<&str> {
        self.0
            .keys()
            .map(String::as_str)
            .find(|k| k.eq_ignore_ascii_case("status"))
    }
}

/// String form of a field value as used by search and stats: strings yield
/// their content, everything else its JSON rendering.
pub fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validate a dataset payload: a JSON array whose elements are all objects.
///
/// Anything else is rejected with a reason suitable for a 400 response; the
/// caller's dataset stays untouched.
pub fn dataset_from_value(value: Value) -> Result<Vec<Record>, String> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(format!(
                "payload must be a JSON array, got {}",
                json_type_name(&other)
            ))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => records.push(Record(map)),
            other => {
                return Err(format!(
                    "element {} must be an object, got {}",
                    i,
                    json_type_name(&other)
                ))
            }
        }
    }
    Ok(records)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record(map),
            _ => panic!("test records must be objects"),
        }
    }

    #[test]
    fn test_matches_string_field_case_insensitive() {
        let r = record(json!({"id": "1", "Status": "Open"}));
        assert!(r.matches("open"));
        assert!(r.matches("OPEN".to_lowercase().as_str()));
        assert!(!r.matches("closed"));
    }

    #[test]
    fn test_matches_numeric_field_via_json_rendering() {
        let r = record(json!({"id": 42, "name": "buoy"}));
        assert!(r.matches("42"));
    }

    #[test]
    fn test_matches_any_field() {
        let r = record(json!({"a": "left", "b": "right"}));
        assert!(r.matches("right"));
    }

    #[test]
    fn test_status_key_case_insensitive() {
        let r = record(json!({"id": "1", "STATUS": "Open"}));
        assert_eq!(r.status_key(), Some("STATUS"));

        let r = record(json!({"id": "1"}));
        assert_eq!(r.status_key(), None);
    }

    #[test]
    fn test_dataset_from_value_accepts_array_of_objects() {
        let dataset = dataset_from_value(json!([{"a": 1}, {"b": 2}])).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_dataset_from_value_rejects_non_array() {
        let err = dataset_from_value(json!({"a": 1})).unwrap_err();
        assert!(err.contains("must be a JSON array"));
    }

    #[test]
    fn test_dataset_from_value_rejects_non_object_element() {
        let err = dataset_from_value(json!([{"a": 1}, "oops"])).unwrap_err();
        assert!(err.contains("element 1"));
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(dataset_from_value(json!([])).unwrap().is_empty());
    }
}
