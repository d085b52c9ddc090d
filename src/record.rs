use crate::scope::Scope;
use crate::tokenize::tokenize;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

pub const TIMESTAMP_KEY: &str = "@timestamp";
pub const CONTEXT_KEY: &str = "context";
pub const LEVEL_KEY: &str = "level";
pub const MESSAGE_KEY: &str = "message";

/// Keys owned by the record itself. Scope and template fields never
/// replace them.
pub const FIXED_KEYS: [&str; 4] = [TIMESTAMP_KEY, CONTEXT_KEY, LEVEL_KEY, MESSAGE_KEY];

pub fn is_fixed_key(key: &str) -> bool {
    FIXED_KEYS.contains(&key)
}

/// One flat log record, ready for a [`LogSink`](crate::sink::LogSink).
///
/// Keys keep insertion order: the four fixed fields first, then inherited
/// scope fields, then fields bound from the message template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogRecord {
    fields: Map<String, Value>,
}

impl LogRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.get(TIMESTAMP_KEY).and_then(Value::as_str)
    }

    pub fn context(&self) -> Option<&str> {
        self.get(CONTEXT_KEY).and_then(Value::as_str)
    }

    pub fn level(&self) -> Option<&str> {
        self.get(LEVEL_KEY).and_then(Value::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.get(MESSAGE_KEY).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Compact single-line JSON, without the trailing newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Build a record from its parts.
///
/// Layers are applied in a fixed order: the fixed fields, then every scope
/// entry whose key is not fixed, then the filled message and the template
/// fields, again skipping fixed keys. A template field with the same name as
/// a scope entry replaces the scope value in place.
pub fn assemble(
    level: &str,
    context: &str,
    scope: &Scope,
    now: &str,
    template: Option<&str>,
    args: &[Value],
) -> LogRecord {
    let mut fields = Map::new();
    fields.insert(TIMESTAMP_KEY.to_string(), Value::from(now));
    fields.insert(CONTEXT_KEY.to_string(), Value::from(context));
    fields.insert(LEVEL_KEY.to_string(), Value::from(level));
    fields.insert(
        MESSAGE_KEY.to_string(),
        Value::from(template.unwrap_or_default()),
    );

    for (key, value) in scope.iter() {
        if !is_fixed_key(key) {
            fields.insert(key.clone(), value.clone());
        }
    }

    let tokenized = tokenize(template, args);
    fields.insert(MESSAGE_KEY.to_string(), Value::String(tokenized.message));
    for (key, value) in tokenized.fields {
        if !is_fixed_key(&key) {
            fields.insert(key, value);
        }
    }

    LogRecord { fields }
}
