use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The output key every evaluated condition exposes.
pub const CONDITION_RESULT_KEY: &str = "output.result";

/// A value usable inside a condition.
///
/// Serialized as `{"type": "static", "value": ..}` or
/// `{"type": "internal", "workUID": .., "key": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operand {
    /// A literal carried in the script itself.
    Static { value: Value },
    /// A field of another step's, operation's or condition's result.
    Internal {
        #[serde(rename = "workUID")]
        owner_id: String,
        #[serde(rename = "key")]
        field_key: String,
    },
}

impl Operand {
    pub fn literal(value: impl Into<Value>) -> Self {
        Operand::Static {
            value: value.into(),
        }
    }

    pub fn internal(owner_id: impl Into<String>, field_key: impl Into<String>) -> Self {
        Operand::Internal {
            owner_id: owner_id.into(),
            field_key: field_key.into(),
        }
    }

    /// The UID this operand reads from, if any.
    pub fn owner_id(&self) -> Option<&str> {
        match self {
            Operand::Internal { owner_id, .. } => Some(owner_id),
            Operand::Static { .. } => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Static { value } => write!(f, "{}", value),
            Operand::Internal {
                owner_id,
                field_key,
            } => write!(f, "${}.{}", owner_id, field_key),
        }
    }
}

/// Projects a dotted path (`output.result`, `output.payload.items.0`) out of a value.
///
/// Numeric segments index into arrays. Returns `None` as soon as a segment is missing.
pub fn lookup_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Truthiness used by pre-computed conditions and the boolean operators.
///
/// `null`, `false`, `0`, `NaN` and the empty string are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
