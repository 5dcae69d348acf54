//! Lenient typed access to the untyped `arguments` object of a tool call.
//!
//! Clients are loose about JSON types (`300` vs `300.0` vs `"300"`), so the
//! getters coerce where the intent is unambiguous and fall back to the
//! caller's default otherwise.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Arguments of one `tools/call`.
///
/// # Examples
///
/// ```rust
/// use caffeinate_mcp::tool::CallArguments;
/// use serde_json::json;
///
/// let args = CallArguments::from_value(json!({"idle": true, "timeout": 300.0}));
/// assert!(args.get_bool("idle", false));
/// assert_eq!(args.get_int("timeout", 0), 300);
/// assert_eq!(args.get_int("pid", 0), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArguments {
    values: Map<String, Value>,
}

impl CallArguments {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Anything but an object yields empty arguments.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    /// Booleans, non-zero numbers and `"true"`/`"1"`-style strings.
    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.values.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(default),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => true,
                "false" | "f" | "0" => false,
                _ => default,
            },
            _ => default,
        }
    }

    /// Integers, floats (truncated toward zero) and numeric strings.
    pub fn get_int(&self, name: &str, default: i64) -> i64 {
        match self.values.get(name) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                .unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Deserialize the whole object into a typed input struct.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.values.clone()))
    }
}

impl From<Map<String, Value>> for CallArguments {
    fn from(values: Map<String, Value>) -> Self {
        Self::new(values)
    }
}
