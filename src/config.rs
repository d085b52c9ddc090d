use crate::env::{env_or, SCOPELOG_CONTEXT_ENV, SCOPELOG_SCOPE_ENV};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Construction parameters of a root [`Logger`](crate::Logger).
///
/// **Fields**
/// - `context`: logger identity written into every record. Missing or
///   `null` means the empty string; any other non-string is rejected.
/// - `scope`: optional initial scope; see [`Scope::from_value`] for how
///   non-object values are flattened.
///
/// [`Scope::from_value`]: crate::scope::Scope::from_value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub context: String,
    #[serde(default)]
    pub scope: Option<Value>,
}

/// Error returned when a configuration cannot produce a logger.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("logger context must be a string, found {found}")]
    InvalidContext { found: &'static str },

    #[error("logger configuration must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("invalid logger configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LoggerConfig {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: Value) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Validate a loosely typed configuration object.
    ///
    /// **Returns**
    /// - `Err(ConfigError::InvalidContext)` if `context` is present and
    ///   not a string.
    /// - `Err(ConfigError::NotAnObject)` if `value` itself is not an object.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let obj = value.as_object().ok_or(ConfigError::NotAnObject {
            found: json_kind(value),
        })?;

        let context = match obj.get("context") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(ConfigError::InvalidContext {
                    found: json_kind(other),
                })
            }
        };
        let scope = obj.get("scope").filter(|v| !v.is_null()).cloned();

        Ok(Self { context, scope })
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Build from `SCOPELOG_CONTEXT` and `SCOPELOG_SCOPE`.
    ///
    /// An unparsable scope is ignored rather than failing startup.
    pub fn from_env() -> Self {
        let context = env_or(SCOPELOG_CONTEXT_ENV, "");
        let scope = std::env::var(SCOPELOG_SCOPE_ENV)
            .ok()
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .filter(|v| !v.is_null());
        Self { context, scope }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
