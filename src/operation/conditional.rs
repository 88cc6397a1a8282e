use super::{Condition, ConditionValue, OutputRef, WorkUnit, lower_condition};
use crate::error::BuildError;
use crate::id::WorkKind;
use crate::operand::Operator;
use crate::script::{ConditionEntry, ConditionalScript, OperationScript};
use crate::step::WorkStep;
use std::collections::BTreeMap;
use tracing::debug;

/// The output fields a conditional operation exposes once it has run.
pub const OPERATION_OUTPUT_KEYS: &[&str] = &["success", "matched"];

/// An if/elif/else chain over conditions, together with every step and
/// nested operation those conditions reference.
///
/// Built either fluently:
///
/// ```
/// use demoswork::prelude::*;
/// use serde_json::json;
///
/// let check = prepare_native_step(json!({ "op": "balance" }));
/// let notify = prepare_native_step(json!({ "op": "notify" }));
/// let refund = prepare_native_step(json!({ "op": "refund" }));
///
/// let operation = ConditionalOperation::new()
///     .if_(check.output("result").unwrap(), Operator::GreaterThan, 100)
///     .then(notify)
///     .else_(refund);
/// assert_eq!(operation.order().len(), 2);
/// ```
///
/// or from fully formed conditions with [`ConditionalOperation::with_conditions`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalOperation {
    id: String,
    critical: bool,
    depends_on: Vec<String>,
    conditions: BTreeMap<String, ConditionEntry>,
    order: Vec<String>,
    steps: BTreeMap<String, WorkStep>,
    operations: BTreeMap<String, OperationScript>,
}

impl Default for ConditionalOperation {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionalOperation {
    pub fn new() -> Self {
        Self {
            id: WorkKind::Operation.new_uid(),
            critical: true,
            depends_on: Vec::new(),
            conditions: BTreeMap::new(),
            order: Vec::new(),
            steps: BTreeMap::new(),
            operations: BTreeMap::new(),
        }
    }

    /// Builds an operation from conditions that already carry their actions.
    /// They are evaluated in the order given.
    pub fn with_conditions(conditions: impl IntoIterator<Item = Condition>) -> Self {
        let mut operation = Self::new();
        for condition in conditions {
            operation.index_condition(condition);
        }
        operation
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    pub fn add_dependency(&mut self, uid: impl Into<String>) {
        self.depends_on.push(uid.into());
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn conditions(&self) -> &BTreeMap<String, ConditionEntry> {
        &self.conditions
    }

    /// Condition ids in evaluation order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Steps collected while building, including those of nested operations.
    pub fn steps(&self) -> &BTreeMap<String, WorkStep> {
        &self.steps
    }

    /// Nested operations collected while building.
    pub fn operations(&self) -> &BTreeMap<String, OperationScript> {
        &self.operations
    }

    /// A reference to this operation's output, usable as a condition operand.
    ///
    /// The reference carries a copy of this operation, so a condition reading
    /// it also registers the operation as nested work of its owner. Push this
    /// operation into the script as well: a nested operation that no condition
    /// runs as `work` is rejected as unreachable by validation.
    pub fn output(&self, key: &str) -> Result<OutputRef, BuildError> {
        let field = key.strip_prefix("output.").unwrap_or(key);
        if !OPERATION_OUTPUT_KEYS.contains(&field) {
            return Err(BuildError::UnknownOutputKey {
                work_id: self.id.clone(),
                kind: "conditional".to_string(),
                key: key.to_string(),
                available: OPERATION_OUTPUT_KEYS.join(", "),
            });
        }
        Ok(OutputRef::new(
            WorkUnit::Operation(Box::new(self.clone())),
            format!("output.{}", field),
        ))
    }

    /// The wire form of this operation alone.
    pub fn script(&self) -> ConditionalScript {
        ConditionalScript {
            id: self.id.clone(),
            critical: self.critical,
            depends_on: self.depends_on.clone(),
            conditions: self.conditions.clone(),
            order: self.order.clone(),
        }
    }

    /// Splits the operation into its own wire form and the work it owns.
    pub fn into_parts(
        self,
    ) -> (
        ConditionalScript,
        BTreeMap<String, WorkStep>,
        BTreeMap<String, OperationScript>,
    ) {
        let script = ConditionalScript {
            id: self.id,
            critical: self.critical,
            depends_on: self.depends_on,
            conditions: self.conditions,
            order: self.order,
        };
        (script, self.steps, self.operations)
    }

    pub fn if_(
        self,
        value_a: impl Into<ConditionValue>,
        operator: Operator,
        value_b: impl Into<ConditionValue>,
    ) -> AwaitingThen {
        self.if_condition(Condition::new(value_a, operator, value_b))
    }

    /// Starts the chain with a prebuilt condition, e.g. a pre-computed one.
    pub fn if_condition(self, condition: Condition) -> AwaitingThen {
        AwaitingThen {
            operation: self,
            pending: condition,
        }
    }

    /// Registers the work a condition references, then records its rows and
    /// appends the root to the evaluation order.
    fn index_condition(&mut self, condition: Condition) {
        let lowered = lower_condition(condition);
        for unit in lowered.work {
            self.add_work(unit);
        }
        for (uid, entry) in lowered.entries {
            self.conditions.insert(uid, entry);
        }
        debug!(operation = %self.id, condition = %lowered.root_id, "Indexed condition");
        self.order.push(lowered.root_id);
    }

    fn add_work(&mut self, unit: WorkUnit) {
        match unit {
            WorkUnit::Step(step) => {
                self.steps.insert(step.id.clone(), step);
            }
            WorkUnit::Operation(operation) => {
                let (script, steps, operations) = operation.into_parts();
                self.steps.extend(steps);
                self.operations.extend(operations);
                self.operations
                    .insert(script.id.clone(), OperationScript::Conditional(script));
            }
        }
    }
}

/// A condition has been opened with `if_` or `elif` and needs its action.
#[derive(Debug, Clone)]
pub struct AwaitingThen {
    operation: ConditionalOperation,
    pending: Condition,
}

impl AwaitingThen {
    pub fn then(mut self, action: impl Into<WorkUnit>) -> AwaitingElifOrElse {
        let condition = self.pending.with_action(action);
        self.operation.index_condition(condition);
        AwaitingElifOrElse {
            operation: self.operation,
        }
    }
}

/// At least one branch is complete; the chain can grow or be closed.
#[derive(Debug, Clone)]
pub struct AwaitingElifOrElse {
    operation: ConditionalOperation,
}

impl AwaitingElifOrElse {
    pub fn elif(
        self,
        value_a: impl Into<ConditionValue>,
        operator: Operator,
        value_b: impl Into<ConditionValue>,
    ) -> AwaitingThen {
        self.elif_condition(Condition::new(value_a, operator, value_b))
    }

    pub fn elif_condition(self, condition: Condition) -> AwaitingThen {
        AwaitingThen {
            operation: self.operation,
            pending: condition,
        }
    }

    /// Closes the chain with a branch that matches whenever it is reached.
    pub fn else_(mut self, action: impl Into<WorkUnit>) -> ConditionalOperation {
        self.operation
            .index_condition(Condition::otherwise().with_action(action));
        self.operation
    }

    /// Closes the chain without an else-branch.
    pub fn end(self) -> ConditionalOperation {
        self.operation
    }
}

impl From<AwaitingElifOrElse> for ConditionalOperation {
    fn from(chain: AwaitingElifOrElse) -> Self {
        chain.end()
    }
}
