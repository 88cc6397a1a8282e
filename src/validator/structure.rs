use super::{ScriptRule, ValidationError, error_codes};
use crate::script::{DemoScript, OperationScript};
use ahash::AHashSet;

/// `operationOrder` and each operation's condition `order` must agree with
/// the tables they index.
///
/// Operations missing from `operationOrder` are allowed only as nested work
/// of some condition.
pub struct OrderRule;

impl ScriptRule for OrderRule {
    fn name(&self) -> &'static str {
        "order-integrity"
    }

    fn check(&self, script: &DemoScript) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (i, uid) in script.operation_order.iter().enumerate() {
            if !script.operations.contains_key(uid) {
                errors.push(
                    ValidationError::new(
                        error_codes::MISSING_OPERATION,
                        format!("Operation {} is ordered but not defined in the script", uid),
                    )
                    .at(format!("operationOrder[{}]", i)),
                );
            }
        }

        let nested: AHashSet<&str> = script
            .conditionals()
            .flat_map(|(_, operation)| operation.conditions.values())
            .filter_map(|entry| entry.work.as_deref())
            .collect();

        for uid in script.operations.keys() {
            if !script.operation_order.contains(uid) && !nested.contains(uid.as_str()) {
                errors.push(
                    ValidationError::new(
                        error_codes::UNREACHABLE_OPERATION,
                        format!(
                            "Operation {} is neither in the operation order nor run by any condition",
                            uid
                        ),
                    )
                    .at(format!("operations.{}", uid)),
                );
            }
        }

        for (uid, operation) in script.conditionals() {
            for (i, cond_id) in operation.order.iter().enumerate() {
                if !operation.conditions.contains_key(cond_id) {
                    errors.push(
                        ValidationError::new(
                            error_codes::MISSING_CONDITION,
                            format!(
                                "Operation {} orders condition {}, which it does not define",
                                uid, cond_id
                            ),
                        )
                        .at(format!("operations.{}.order[{}]", uid, i)),
                    );
                }
            }
        }

        errors
    }
}

/// Every operation must be of a kind the executor can run.
pub struct OperationKindRule;

impl ScriptRule for OperationKindRule {
    fn name(&self) -> &'static str {
        "operation-kind"
    }

    fn check(&self, script: &DemoScript) -> Vec<ValidationError> {
        script
            .operations
            .iter()
            .filter_map(|(uid, operation)| match operation {
                OperationScript::Unsupported(op) => Some(
                    ValidationError::new(
                        error_codes::UNSUPPORTED_OPERATION,
                        format!(
                            "Operation {} has unsupported operation type: {}",
                            uid, op.operation_type
                        ),
                    )
                    .at(format!("operations.{}.operationType", uid)),
                ),
                OperationScript::Conditional(_) => None,
            })
            .collect()
    }
}
