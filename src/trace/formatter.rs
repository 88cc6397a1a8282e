use super::{ConditionRecord, ConditionTrace, ExecutionTrace};
use serde_json::Value;

/// Formats condition traces into human-readable strings
pub struct TraceFormatter;

impl TraceFormatter {
    /// Format a condition trace into a human-readable explanation.
    pub fn format_trace(trace: &ConditionTrace) -> String {
        Self::format_recursive(trace, 0)
    }

    /// One line per evaluated condition.
    pub fn format_execution(trace: &ExecutionTrace) -> String {
        trace
            .records
            .iter()
            .map(Self::format_record)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_record(record: &ConditionRecord) -> String {
        let verdict = match (&record.work, record.matched) {
            (Some(work), true) => format!("matched, ran {}", work),
            (None, true) => "matched".to_string(),
            (_, false) => "not matched".to_string(),
        };
        format!(
            "[{}] {}: {} => {}",
            record.operation_id,
            record.condition_id,
            Self::format_trace(&record.trace),
            verdict
        )
    }

    /// Recursively formats the trace, adding parentheses only when necessary.
    fn format_recursive(trace: &ConditionTrace, parent_precedence: u8) -> String {
        let current_precedence = trace.precedence();
        let needs_parens = current_precedence < parent_precedence;

        let mut result = String::new();
        if needs_parens {
            result.push('(');
        }

        match trace {
            ConditionTrace::Binary {
                operator,
                left,
                right,
                ..
            } => {
                let left_str = Self::format_recursive(left, current_precedence);
                if !matches!(**right, ConditionTrace::NotEvaluated) {
                    let right_str = Self::format_recursive(right, current_precedence);
                    result.push_str(&format!("{} {} {}", left_str, operator, right_str));
                } else {
                    // short-circuited: the left side decided the outcome
                    result.push_str(&left_str);
                }
            }
            ConditionTrace::Unary {
                operator, child, ..
            } => {
                let child_str = Self::format_recursive(child, current_precedence);
                result.push_str(&format!("{} {}", operator, child_str));
            }
            ConditionTrace::Precomputed { value, .. } => {
                result.push_str(&Self::format_recursive(value, current_precedence));
            }
            ConditionTrace::Otherwise => result.push_str("else"),
            ConditionTrace::Leaf { source, value } => {
                let formatted_leaf = if source.starts_with('$') {
                    format!("{} (was {})", source, Self::format_value(value))
                } else {
                    source.clone()
                };
                result.push_str(&formatted_leaf);
            }
            ConditionTrace::NotEvaluated => {}
        }

        if needs_parens {
            result.push(')');
        }
        result
    }

    fn format_value(value: &Value) -> String {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && n.is_f64() => format!("{}", f as i64),
                _ => n.to_string(),
            },
            other => other.to_string(),
        }
    }
}
