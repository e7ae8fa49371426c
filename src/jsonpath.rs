//! JSONPath helpers
//!
//! Simple dot paths (`$.paging.next`, `data.items`) are walked directly;
//! anything with wildcards or filters goes through jsonpath-rust.

use crate::error::{Error, Result};
use serde_json::Value;

/// Find every value matched by `path`.
///
/// A missing path yields an empty list, never an error.
pub fn find_all(value: &Value, path: &str) -> Result<Vec<Value>> {
    if is_simple_path(path) {
        return Ok(extract_simple_path(value, path)
            .map(|v| vec![v.clone()])
            .unwrap_or_default());
    }
    extract_with_jsonpath(value, path)
}

/// Find the first value matched by `path`
pub fn find_first(value: &Value, path: &str) -> Result<Option<Value>> {
    Ok(find_all(value, path)?.into_iter().next())
}

/// Extract a scalar as a string, treating null and empty strings as absent
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_simple_path(path: &str) -> bool {
    !path.contains('[') && !path.contains('*') && !path.contains('?')
}

/// Walk a dot-notation path such as `$.paging.next`
fn extract_simple_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    let path = path
        .strip_prefix("$.")
        .or_else(|| path.strip_prefix('$'))
        .unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => current = map.get(part)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Extract values using jsonpath-rust
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}
