//! Recursive metadata updates
//!
//! A YAML header expresses an update to the notebook metadata: a `null` value
//! removes a key, a mapping is merged key by key, anything else overwrites.

use super::Metadata;
use serde_json::{Map, Value};

/// One node of a metadata update
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Replace the target value
    Overwrite(Value),
    /// Merge the nested updates into the target mapping
    Merge(Vec<(String, Update)>),
    /// Remove the target key
    Delete,
}

impl Update {
    /// Interpret a JSON value as an update
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Update::Delete,
            Value::Object(map) => Update::Merge(
                map.into_iter()
                    .map(|(key, value)| (key, Update::from_value(value)))
                    .collect(),
            ),
            other => Update::Overwrite(other),
        }
    }

    /// Interpret every entry of a mapping as an update of the same key
    pub fn from_map(map: Metadata) -> Vec<(String, Update)> {
        map.into_iter()
            .map(|(key, value)| (key, Update::from_value(value)))
            .collect()
    }
}

/// Apply `updates` to `target`, recursively.
///
/// Deleting a missing key is a no-op. Merging into a key that holds a
/// non-mapping value replaces it with a fresh mapping first.
pub fn apply_updates(target: &mut Metadata, updates: Vec<(String, Update)>) {
    for (key, update) in updates {
        match update {
            Update::Delete => {
                target.remove(&key);
            }
            Update::Overwrite(value) => {
                target.insert(key, value);
            }
            Update::Merge(nested) => {
                let entry = target
                    .entry(key)
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                if let Value::Object(map) = entry {
                    apply_updates(map, nested);
                }
            }
        }
    }
}

/// Merge `update` into `target` with delete-on-null semantics
pub fn recursive_update(target: &mut Metadata, update: Metadata) {
    apply_updates(target, Update::from_map(update));
}
