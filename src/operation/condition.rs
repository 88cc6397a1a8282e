use super::ConditionalOperation;
use crate::id::WorkKind;
use crate::operand::Operator;
use crate::step::WorkStep;
use serde_json::Value;

/// Something a condition can run when it holds: a step or a nested operation.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkUnit {
    Step(WorkStep),
    Operation(Box<ConditionalOperation>),
}

impl WorkUnit {
    pub fn id(&self) -> &str {
        match self {
            WorkUnit::Step(step) => &step.id,
            WorkUnit::Operation(operation) => operation.id(),
        }
    }
}

impl From<WorkStep> for WorkUnit {
    fn from(step: WorkStep) -> Self {
        WorkUnit::Step(step)
    }
}

impl From<ConditionalOperation> for WorkUnit {
    fn from(operation: ConditionalOperation) -> Self {
        WorkUnit::Operation(Box::new(operation))
    }
}

/// A reference to one output field of a step or operation.
///
/// It keeps a copy of the work it points at so that building a condition on
/// it also registers that work in the owning operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRef {
    work: WorkUnit,
    key: String,
}

impl OutputRef {
    pub(crate) fn new(work: WorkUnit, key: impl Into<String>) -> Self {
        Self {
            work,
            key: key.into(),
        }
    }

    pub fn owner_id(&self) -> &str {
        self.work.id()
    }

    /// The dotted path into the owner's result, e.g. `output.hash`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn into_work(self) -> WorkUnit {
        self.work
    }
}

/// An operand as written by an operation author, before lowering.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    Literal(Value),
    Output(OutputRef),
    /// A nested boolean sub-expression.
    Condition(Box<Condition>),
}

impl From<Value> for ConditionValue {
    fn from(value: Value) -> Self {
        ConditionValue::Literal(value)
    }
}

impl From<OutputRef> for ConditionValue {
    fn from(output: OutputRef) -> Self {
        ConditionValue::Output(output)
    }
}

impl From<Condition> for ConditionValue {
    fn from(condition: Condition) -> Self {
        ConditionValue::Condition(Box::new(condition))
    }
}

macro_rules! literal_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ConditionValue {
                fn from(value: $ty) -> Self {
                    ConditionValue::Literal(Value::from(value))
                }
            }
        )*
    };
}

literal_from!(&str, String, bool, i32, i64, u32, u64, f64);

/// A single comparison, optionally carrying the work to run when it holds.
///
/// `operator == None` is either an else-branch (no `value_a`) or a
/// pre-computed condition decided by the truthiness of `value_a`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub(crate) id: String,
    pub operator: Option<Operator>,
    pub value_a: Option<ConditionValue>,
    pub value_b: Option<ConditionValue>,
    pub action: Option<WorkUnit>,
}

impl Condition {
    /// A comparison `value_a <operator> value_b`. For the unary `not`,
    /// `value_b` is ignored.
    pub fn new(
        value_a: impl Into<ConditionValue>,
        operator: Operator,
        value_b: impl Into<ConditionValue>,
    ) -> Self {
        let value_b = if operator.is_unary() {
            None
        } else {
            Some(value_b.into())
        };
        Self {
            id: WorkKind::Condition.new_uid(),
            operator: Some(operator),
            value_a: Some(value_a.into()),
            value_b,
            action: None,
        }
    }

    pub fn not(value: impl Into<ConditionValue>) -> Self {
        Self {
            id: WorkKind::Condition.new_uid(),
            operator: Some(Operator::Not),
            value_a: Some(value.into()),
            value_b: None,
            action: None,
        }
    }

    /// A condition decided by the truthiness of a single value.
    pub fn precomputed(value: impl Into<ConditionValue>) -> Self {
        Self {
            id: WorkKind::Condition.new_uid(),
            operator: None,
            value_a: Some(value.into()),
            value_b: None,
            action: None,
        }
    }

    /// An unconditional branch.
    pub(crate) fn otherwise() -> Self {
        Self {
            id: WorkKind::Condition.new_uid(),
            operator: None,
            value_a: None,
            value_b: None,
            action: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<WorkUnit>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_else(&self) -> bool {
        self.operator.is_none() && self.value_a.is_none()
    }
}
