use super::{Condition, ConditionValue, WorkUnit};
use crate::operand::{CONDITION_RESULT_KEY, Operand};
use crate::script::ConditionEntry;

/// The flat form of one condition tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredCondition {
    /// Id of the top-level condition; the one that goes into `order`.
    pub root_id: String,
    /// Nested conditions first, the root last.
    pub entries: Vec<(String, ConditionEntry)>,
    /// Steps and operations referenced by the tree, as actions or operands.
    pub work: Vec<WorkUnit>,
}

/// Flattens a condition tree into table rows.
///
/// Every nested condition used as an operand becomes its own row and is
/// replaced in its parent by an internal operand on `output.result`. Work is
/// collected before the row that references it.
pub fn lower_condition(condition: Condition) -> LoweredCondition {
    let mut lowered = LoweredCondition {
        root_id: condition.id.clone(),
        entries: Vec::new(),
        work: Vec::new(),
    };
    lower_into(condition, &mut lowered);
    lowered
}

fn lower_into(condition: Condition, out: &mut LoweredCondition) {
    let Condition {
        id,
        operator,
        value_a,
        value_b,
        action,
    } = condition;

    let work = action.map(|unit| {
        let uid = unit.id().to_string();
        out.work.push(unit);
        uid
    });
    let value_a = value_a.map(|value| lower_value(value, out));
    let value_b = value_b.map(|value| lower_value(value, out));

    out.entries.push((
        id,
        ConditionEntry {
            operator,
            value_a,
            value_b,
            work,
        },
    ));
}

fn lower_value(value: ConditionValue, out: &mut LoweredCondition) -> Operand {
    match value {
        ConditionValue::Literal(value) => Operand::Static { value },
        ConditionValue::Output(output) => {
            let operand = Operand::internal(output.owner_id(), output.key());
            out.work.push(output.into_work());
            operand
        }
        ConditionValue::Condition(nested) => {
            let nested_id = nested.id.clone();
            lower_into(*nested, out);
            Operand::internal(nested_id, CONDITION_RESULT_KEY)
        }
    }
}
