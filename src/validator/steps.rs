use super::{ScriptRule, ValidationError, error_codes};
use crate::id::WorkKind;
use crate::script::DemoScript;
use ahash::AHashSet;

/// Every step must be run or read by at least one condition.
pub struct UnusedStepRule;

impl ScriptRule for UnusedStepRule {
    fn name(&self) -> &'static str {
        "unused-step"
    }

    fn check(&self, script: &DemoScript) -> Vec<ValidationError> {
        let mut used: AHashSet<&str> = AHashSet::new();
        for (_, operation) in script.conditionals() {
            for entry in operation.conditions.values() {
                used.extend(
                    entry
                        .work
                        .as_deref()
                        .into_iter()
                        .chain(entry.referenced_owners())
                        .filter(|uid| WorkKind::of(uid) == Some(WorkKind::Step)),
                );
            }
        }

        script
            .steps
            .iter()
            .filter(|(uid, _)| !used.contains(uid.as_str()))
            .map(|(uid, step)| {
                let label = step.description.as_deref().unwrap_or(uid);
                ValidationError::new(
                    error_codes::UNUSED_STEP,
                    format!("Step {} not used in script", label),
                )
                .at(format!("steps.{}", uid))
            })
            .collect()
    }
}
