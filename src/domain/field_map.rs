// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat field maps and field-level differencing.
//!
//! A [`FieldMap`] is the flat view of a record that the watcher compares between
//! reconciliation ticks. Nested structures are flattened using dot notation, so a
//! record like:
//!
//! ```json
//! { "database": { "host": "localhost", "port": 5432 } }
//! ```
//!
//! becomes `database.host -> "localhost"` and `database.port -> 5432`. Sequences are
//! kept whole as a single field value.

use crate::domain::errors::{ConfigError, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// A flat mapping from field name to field value.
pub type FieldMap = HashMap<String, Value>;

/// Flattens any serializable value into a [`FieldMap`].
///
/// The value must serialize to a map (a struct or a map type). `null` flattens to
/// an empty field map.
///
/// # Examples
///
/// ```
/// use serde::Serialize;
/// use streamcfg::domain::flatten_fields;
///
/// #[derive(Serialize)]
/// struct Db { host: String, port: u16 }
///
/// #[derive(Serialize)]
/// struct Settings { name: String, db: Db }
///
/// let fields = flatten_fields(&Settings {
///     name: "app".into(),
///     db: Db { host: "localhost".into(), port: 5432 },
/// }).unwrap();
///
/// assert_eq!(fields["db.host"], "localhost");
/// assert_eq!(fields["db.port"], 5432);
/// ```
pub fn flatten_fields<T: Serialize + ?Sized>(record: &T) -> Result<FieldMap> {
    let value = serde_json::to_value(record).map_err(|e| ConfigError::FieldMapping {
        message: e.to_string(),
    })?;
    flatten_value(&value)
}

/// Flattens an already-serialized value into a [`FieldMap`].
pub fn flatten_value(value: &Value) -> Result<FieldMap> {
    let mut fields = FieldMap::new();
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, val) in map {
                flatten_into(val, key, &mut fields);
            }
        }
        other => {
            return Err(ConfigError::FieldMapping {
                message: format!("record must serialize to a map, got {}", kind_of(other)),
            })
        }
    }
    Ok(fields)
}

fn flatten_into(value: &Value, prefix: &str, fields: &mut FieldMap) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, val) in map {
                flatten_into(val, &format!("{}.{}", prefix, key), fields);
            }
        }
        other => {
            fields.insert(prefix.to_string(), other.clone());
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}

/// Returns the fields of `new` whose value differs from `old`.
///
/// A field is reported when it is absent from `old` or when its value is not
/// structurally equal to the old one. Fields only present in `old` are not
/// reported. An empty result means nothing changed.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use streamcfg::domain::{diff_fields, FieldMap};
///
/// let old: FieldMap = [("a".to_string(), json!(1)), ("b".to_string(), json!(2))].into();
/// let new: FieldMap = [("a".to_string(), json!(1)), ("b".to_string(), json!(3))].into();
///
/// let delta = diff_fields(&old, &new);
/// assert_eq!(delta.len(), 1);
/// assert_eq!(delta["b"], 3);
/// ```
pub fn diff_fields(old: &FieldMap, new: &FieldMap) -> FieldMap {
    new.iter()
        .filter(|(key, value)| old.get(key.as_str()) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Inner {
        host: String,
        port: u16,
    }

    #[derive(Serialize)]
    struct Outer {
        name: String,
        tags: Vec<String>,
        inner: Inner,
    }

    fn sample() -> Outer {
        Outer {
            name: "svc".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
            inner: Inner {
                host: "localhost".to_string(),
                port: 8080,
            },
        }
    }

    #[test]
    fn test_flatten_nested_struct() {
        let fields = flatten_fields(&sample()).unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields["name"], json!("svc"));
        assert_eq!(fields["tags"], json!(["a", "b"]));
        assert_eq!(fields["inner.host"], json!("localhost"));
        assert_eq!(fields["inner.port"], json!(8080));
    }

    #[test]
    fn test_flatten_null_is_empty() {
        let fields = flatten_value(&Value::Null).unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_flatten_scalar_is_rejected() {
        let result = flatten_value(&json!(42));
        assert!(matches!(result, Err(ConfigError::FieldMapping { .. })));
    }

    #[test]
    fn test_flatten_keeps_empty_object_as_leaf() {
        let fields = flatten_value(&json!({"extra": {}})).unwrap();
        assert_eq!(fields["extra"], json!({}));
    }

    #[test]
    fn test_diff_same_is_empty() {
        let fields = flatten_fields(&sample()).unwrap();
        assert!(diff_fields(&fields, &fields).is_empty());
    }

    #[test]
    fn test_diff_reports_changed_and_added() {
        let old = flatten_value(&json!({"a": 1, "b": {"c": true}})).unwrap();
        let new = flatten_value(&json!({"a": 1, "b": {"c": false}, "d": "x"})).unwrap();

        let delta = diff_fields(&old, &new);
        assert_eq!(delta.len(), 2);
        assert_eq!(delta["b.c"], json!(false));
        assert_eq!(delta["d"], json!("x"));
    }

    #[test]
    fn test_diff_ignores_removed_fields() {
        let old = flatten_value(&json!({"a": 1, "b": 2})).unwrap();
        let new = flatten_value(&json!({"a": 1})).unwrap();
        assert!(diff_fields(&old, &new).is_empty());
    }

    #[test]
    fn test_diff_deep_sequence_equality() {
        let old = flatten_value(&json!({"list": [1, 2, 3]})).unwrap();
        let same = flatten_value(&json!({"list": [1, 2, 3]})).unwrap();
        let changed = flatten_value(&json!({"list": [1, 2]})).unwrap();

        assert!(diff_fields(&old, &same).is_empty());
        assert_eq!(diff_fields(&old, &changed)["list"], json!([1, 2]));
    }
}
