use super::Results;
use crate::error::ExecutionError;
use crate::operand::{Operand, lookup_path};
use serde_json::Value;

/// Resolves an operand against the results written so far.
///
/// Static operands resolve to their literal. Internal operands project their
/// dotted `field_key` out of the owner's result; they fail if the owner has
/// no result yet or the field does not exist on it.
pub fn resolve(operand: &Operand, results: &Results) -> Result<Value, ExecutionError> {
    match operand {
        Operand::Static { value } => Ok(value.clone()),
        Operand::Internal {
            owner_id,
            field_key,
        } => {
            let record = results
                .get(owner_id)
                .ok_or_else(|| ExecutionError::UnresolvedReference {
                    owner_id: owner_id.clone(),
                })?;
            lookup_path(record, field_key)
                .cloned()
                .ok_or_else(|| ExecutionError::UnresolvedField {
                    owner_id: owner_id.clone(),
                    field_key: field_key.clone(),
                })
        }
    }
}
