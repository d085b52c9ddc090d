use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Immutable set of contextual fields carried by a logger.
///
/// A scope is never mutated after construction. [`Scope::overlay`] copies
/// the parent entries into a fresh map, so loggers derived from the same
/// parent share nothing that either of them can change. Cloning a scope
/// only bumps a reference count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    fields: Arc<Map<String, Value>>,
}

impl Scope {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot `value` into a new scope.
    ///
    /// Objects contribute their entries. Arrays contribute one entry per
    /// element keyed by its index (`"0"`, `"1"`, ...); this mirrors how the
    /// records have always been flattened and is kept for compatibility,
    /// not as something to build on. `null` and scalars contribute nothing.
    pub fn from_value(value: &Value) -> Self {
        Self::empty().overlay(value)
    }

    /// Derive a new scope: a copy of `self` with the entries of `overlay`
    /// applied on top, overwriting same-named keys.
    pub fn overlay(&self, overlay: &Value) -> Self {
        let mut fields = Map::clone(&self.fields);
        match overlay {
            Value::Object(map) => {
                for (key, value) in map {
                    fields.insert(key.clone(), value.clone());
                }
            }
            Value::Array(items) => {
                for (index, value) in items.iter().enumerate() {
                    fields.insert(index.to_string(), value.clone());
                }
            }
            _ => {}
        }
        Scope {
            fields: Arc::new(fields),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(Map::clone(&self.fields))
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.as_ref().serialize(serializer)
    }
}

impl From<Map<String, Value>> for Scope {
    fn from(fields: Map<String, Value>) -> Self {
        Scope {
            fields: Arc::new(fields),
        }
    }
}
