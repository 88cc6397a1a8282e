use super::value::is_truthy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Operators recognized inside a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    // Equality
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "===")]
    StrictEqual,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "!==")]
    StrictNotEqual,

    // Ordering
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<")]
    SmallerThan,
    #[serde(rename = "<=")]
    SmallerThanOrEqual,

    // Membership
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not in")]
    NotIn,

    // Logical
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "not")]
    Not,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::StrictEqual => "===",
            Operator::NotEqual => "!=",
            Operator::StrictNotEqual => "!==",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::SmallerThan => "<",
            Operator::SmallerThanOrEqual => "<=",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Not => "not",
        }
    }

    /// Parses an operator from its symbol.
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        Some(match symbol {
            "==" => Operator::Equal,
            "===" => Operator::StrictEqual,
            "!=" => Operator::NotEqual,
            "!==" => Operator::StrictNotEqual,
            ">" => Operator::GreaterThan,
            ">=" => Operator::GreaterThanOrEqual,
            "<" => Operator::SmallerThan,
            "<=" => Operator::SmallerThanOrEqual,
            "in" => Operator::In,
            "not in" => Operator::NotIn,
            "&&" => Operator::And,
            "||" => Operator::Or,
            "not" => Operator::Not,
            _ => return None,
        })
    }

    /// Unary operators ignore `value_b`.
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::Not)
    }

    /// Applies the operator to two resolved operands.
    ///
    /// The comparison is total: operand pairs that cannot be compared
    /// (an object against a number, say) make the condition false instead of
    /// failing the run.
    pub fn apply(&self, a: &Value, b: &Value) -> bool {
        match self {
            Operator::Equal => loose_eq(a, b),
            Operator::StrictEqual => strict_eq(a, b),
            Operator::NotEqual => !loose_eq(a, b),
            Operator::StrictNotEqual => !strict_eq(a, b),
            Operator::GreaterThan => matches!(order(a, b), Some(Ordering::Greater)),
            Operator::GreaterThanOrEqual => {
                matches!(order(a, b), Some(Ordering::Greater | Ordering::Equal))
            }
            Operator::SmallerThan => matches!(order(a, b), Some(Ordering::Less)),
            Operator::SmallerThanOrEqual => {
                matches!(order(a, b), Some(Ordering::Less | Ordering::Equal))
            }
            Operator::In => contains(b, a),
            Operator::NotIn => !contains(b, a),
            Operator::And => is_truthy(a) && is_truthy(b),
            Operator::Or => is_truthy(a) || is_truthy(b),
            Operator::Not => !is_truthy(a),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Numeric view of a value for the loose operators.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        // 1 and 1.0 are distinct `Value`s but the same number
        (Value::Number(l), Value::Number(r)) => l.as_f64() == r.as_f64(),
        _ => a == b,
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(l), Value::String(r)) => l == r,
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
            strict_eq(a, b)
        }
        _ => match (as_number(a), as_number(b)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        },
    }
}

fn order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => as_number(a)?.partial_cmp(&as_number(b)?),
    }
}

fn contains(container: &Value, item: &Value) -> bool {
    match container {
        Value::Array(items) => items.iter().any(|candidate| loose_eq(candidate, item)),
        Value::Object(map) => item.as_str().is_some_and(|key| map.contains_key(key)),
        Value::String(haystack) => item.as_str().is_some_and(|needle| haystack.contains(needle)),
        _ => false,
    }
}
