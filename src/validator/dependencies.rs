use super::{ScriptRule, ValidationError, error_codes};
use crate::id::is_work_uid;
use crate::script::DemoScript;

/// Every `depends_on` entry must be a step or operation UID present in the script.
pub struct DependencyRule;

impl DependencyRule {
    fn check_item(
        script: &DemoScript,
        entity: &str,
        label: &str,
        path: &str,
        depends_on: &[&str],
        errors: &mut Vec<ValidationError>,
    ) {
        for (i, dep) in depends_on.iter().enumerate() {
            let at = format!("{}.depends_on[{}]", path, i);
            if !is_work_uid(dep) {
                errors.push(
                    ValidationError::new(
                        error_codes::INVALID_DEPENDENCY,
                        format!("{} {} depends on an invalid work UID: {}", entity, label, dep),
                    )
                    .at(at.clone()),
                );
            }
            if !script.steps.contains_key(*dep) && !script.operations.contains_key(*dep) {
                errors.push(
                    ValidationError::new(
                        error_codes::MISSING_DEPENDENCY,
                        format!(
                            "{} {} depends on a non-existent work UID: {}",
                            entity, label, dep
                        ),
                    )
                    .at(at),
                );
            }
        }
    }
}

impl ScriptRule for DependencyRule {
    fn name(&self) -> &'static str {
        "dependency-integrity"
    }

    fn check(&self, script: &DemoScript) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (uid, operation) in &script.operations {
            Self::check_item(
                script,
                "Operation",
                uid,
                &format!("operations.{}", uid),
                &operation.depends_on(),
                &mut errors,
            );
        }

        for (uid, step) in &script.steps {
            let depends_on: Vec<&str> = step.depends_on.iter().map(String::as_str).collect();
            Self::check_item(
                script,
                "Step",
                step.description.as_deref().unwrap_or(uid),
                &format!("steps.{}", uid),
                &depends_on,
                &mut errors,
            );
        }

        errors
    }
}
