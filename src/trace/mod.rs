//! Records of how conditions were evaluated during a run.

mod formatter;

pub use formatter::TraceFormatter;

use crate::operand::{Operator, is_truthy};
use serde_json::Value;

/// How one condition (or one operand of it) was evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTrace {
    Binary {
        operator: Operator,
        left: Box<ConditionTrace>,
        right: Box<ConditionTrace>,
        outcome: bool,
    },
    Unary {
        operator: Operator,
        child: Box<ConditionTrace>,
        outcome: bool,
    },
    /// A condition without operator, decided by the truthiness of its value.
    Precomputed {
        value: Box<ConditionTrace>,
        outcome: bool,
    },
    /// An else-branch.
    Otherwise,
    /// A resolved operand. `source` is `$owner.key` for references.
    Leaf {
        source: String,
        value: Value,
    },
    /// Skipped by `&&`/`||` short-circuiting.
    NotEvaluated,
}

impl ConditionTrace {
    pub fn get_outcome(&self) -> Value {
        match self {
            ConditionTrace::Binary { outcome, .. }
            | ConditionTrace::Unary { outcome, .. }
            | ConditionTrace::Precomputed { outcome, .. } => Value::Bool(*outcome),
            ConditionTrace::Otherwise => Value::Bool(true),
            ConditionTrace::Leaf { value, .. } => value.clone(),
            ConditionTrace::NotEvaluated => Value::Null,
        }
    }

    pub fn holds(&self) -> bool {
        is_truthy(&self.get_outcome())
    }

    pub fn precedence(&self) -> u8 {
        match self {
            ConditionTrace::Binary { operator, .. } => match operator {
                Operator::Or => 1,
                Operator::And => 2,
                Operator::Equal
                | Operator::StrictEqual
                | Operator::NotEqual
                | Operator::StrictNotEqual
                | Operator::In
                | Operator::NotIn => 4,
                Operator::GreaterThan
                | Operator::GreaterThanOrEqual
                | Operator::SmallerThan
                | Operator::SmallerThanOrEqual => 5,
                Operator::Not => 8,
            },
            ConditionTrace::Unary { .. } | ConditionTrace::Precomputed { .. } => 8,
            ConditionTrace::Otherwise | ConditionTrace::Leaf { .. } | ConditionTrace::NotEvaluated => 9,
        }
    }
}

/// The evaluation of one top-level condition of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionRecord {
    pub operation_id: String,
    pub condition_id: String,
    pub trace: ConditionTrace,
    pub matched: bool,
    /// The work that ran because the condition matched.
    pub work: Option<String>,
}

/// Every condition evaluated during a run, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionTrace {
    pub records: Vec<ConditionRecord>,
}

impl ExecutionTrace {
    pub fn push(&mut self, record: ConditionRecord) {
        self.records.push(record);
    }

    pub fn for_operation<'a>(
        &'a self,
        operation_id: &'a str,
    ) -> impl Iterator<Item = &'a ConditionRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| record.operation_id == operation_id)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
