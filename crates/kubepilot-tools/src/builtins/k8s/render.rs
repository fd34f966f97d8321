//! Resource rendering
//!
//! Objects are shown to the planner as YAML without the server-side bookkeeping
//! that only wastes context: `metadata.managedFields` is removed, and null or
//! empty values are pruned recursively. Entries inside lists are kept as they are.

use crate::error::{Error, Result};
use serde_json::Value;

/// Render an object for the planner
pub fn render_resource(object: &Value) -> Result<String> {
    let mut object = object.clone();
    if let Some(metadata) = object.get_mut("metadata").and_then(Value::as_object_mut) {
        metadata.remove("managedFields");
    }

    let cleaned = prune(object).unwrap_or(Value::Object(serde_json::Map::new()));
    let yaml = serde_yaml::to_string(&cleaned)
        .map_err(|e| Error::Upstream(format!("failed to render resource as yaml: {}", e)))?;

    Ok(yaml
        .lines()
        .filter(|line| !is_null_entry(line))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// A `key: null` mapping line; list entries and values that merely contain
/// the word are kept
fn is_null_entry(line: &str) -> bool {
    let line = line.trim();
    !line.starts_with('-') && (line.ends_with(": null") || line.ends_with(": ~"))
}

/// Drop nulls and empty containers from maps; `None` means "remove me"
fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Object(map) => {
            let cleaned: serde_json::Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| prune(v).map(|v| (k, v)))
                .collect();
            (!cleaned.is_empty()).then_some(Value::Object(cleaned))
        }
        Value::Array(items) => {
            if items.is_empty() {
                return None;
            }
            Some(Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(_) => {
                            prune(item).unwrap_or(Value::Object(serde_json::Map::new()))
                        }
                        other => other,
                    })
                    .collect(),
            ))
        }
        other => Some(other),
    }
}
