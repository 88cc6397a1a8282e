use super::{ScriptRule, ValidationError, error_codes};
use crate::id::WorkKind;
use crate::operand::{CONDITION_RESULT_KEY, Operand};
use crate::operation::OPERATION_OUTPUT_KEYS;
use crate::script::{ConditionalScript, DemoScript};

/// Every condition `work` and internal operand must point at something that exists.
///
/// Operands may point at steps, operations, or conditions of the same
/// operation. Operands must also name a field the owner exposes.
pub struct ReferenceRule;

impl ReferenceRule {
    fn check_operand(
        script: &DemoScript,
        operation: &ConditionalScript,
        operand: &Operand,
        path: String,
        errors: &mut Vec<ValidationError>,
    ) {
        let Operand::Internal {
            owner_id,
            field_key,
        } = operand
        else {
            return;
        };

        let field = field_key.strip_prefix("output.").unwrap_or_default();
        let head = field.split('.').next().unwrap_or_default();
        let exposed = match WorkKind::of(owner_id) {
            Some(WorkKind::Condition) if operation.conditions.contains_key(owner_id) => {
                field_key == CONDITION_RESULT_KEY
            }
            Some(WorkKind::Step) if script.steps.contains_key(owner_id) => {
                script.steps[owner_id].context.output_keys().contains(&head)
            }
            Some(WorkKind::Operation) if script.operations.contains_key(owner_id) => {
                OPERATION_OUTPUT_KEYS.contains(&head)
            }
            _ => {
                errors.push(
                    ValidationError::new(
                        error_codes::DANGLING_REFERENCE,
                        format!(
                            "Operation {} reads from {}, which is not defined in the script",
                            operation.id, owner_id
                        ),
                    )
                    .at(path),
                );
                return;
            }
        };

        if !exposed {
            errors.push(
                ValidationError::new(
                    error_codes::UNKNOWN_OUTPUT_FIELD,
                    format!(
                        "Operation {} reads unknown field '{}' of {}",
                        operation.id, field_key, owner_id
                    ),
                )
                .at(path),
            );
        }
    }
}

impl ScriptRule for ReferenceRule {
    fn name(&self) -> &'static str {
        "dangling-reference"
    }

    fn check(&self, script: &DemoScript) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (uid, operation) in script.conditionals() {
            for (cond_id, entry) in &operation.conditions {
                let path = format!("operations.{}.conditions.{}", uid, cond_id);

                if let Some(work) = &entry.work {
                    let is_work = matches!(
                        WorkKind::of(work),
                        Some(WorkKind::Step) | Some(WorkKind::Operation)
                    );
                    if !is_work || !script.contains_work(work) {
                        errors.push(
                            ValidationError::new(
                                error_codes::DANGLING_REFERENCE,
                                format!(
                                    "Condition {} of operation {} runs {}, which is not defined in the script",
                                    cond_id, uid, work
                                ),
                            )
                            .at(format!("{}.work", path)),
                        );
                    }
                }

                if let Some(operand) = &entry.value_a {
                    Self::check_operand(
                        script,
                        operation,
                        operand,
                        format!("{}.value_a", path),
                        &mut errors,
                    );
                }
                if let Some(operand) = &entry.value_b {
                    Self::check_operand(
                        script,
                        operation,
                        operand,
                        format!("{}.value_b", path),
                        &mut errors,
                    );
                }
            }
        }

        errors
    }
}
