//! Tests for the structural validator.
mod common;
use common::*;
use demoswork::prelude::*;
use demoswork::script::ConditionalScript;
use demoswork::validator::{ScriptRule, error_codes};
use serde_json::json;

fn conditional_mut<'a>(script: &'a mut DemoScript, uid: &str) -> &'a mut ConditionalScript {
    match script.operations.get_mut(uid) {
        Some(OperationScript::Conditional(operation)) => operation,
        _ => panic!("{} is not a conditional operation", uid),
    }
}

fn codes(err: &ScriptError) -> Vec<&'static str> {
    err.validation_errors().iter().map(|e| e.code).collect()
}

#[cfg(test)]
mod validator_tests {
    use super::*;

    #[test]
    fn test_built_work_is_valid() {
        let fixture = create_branching_work();
        assert!(fixture.work.validate().is_ok());
    }

    #[test]
    fn test_nested_operations_are_valid() {
        let inner = ConditionalOperation::new()
            .if_condition(Condition::precomputed(true))
            .then(native_step("inner"))
            .end();
        let outer = ConditionalOperation::new()
            .if_condition(Condition::precomputed(true))
            .then(inner)
            .end();

        let mut work = DemosWork::new();
        work.push(outer);
        assert_eq!(work.script().operations.len(), 2);
        assert_eq!(work.script().operation_order.len(), 1);
        assert!(work.validate().is_ok());
    }

    #[test]
    fn test_unused_step_is_named() {
        let fixture = create_branching_work();
        let mut script = fixture.work.script().clone();
        let orphan = native_step("orphan").with_description("Orphan");
        script.steps.insert(orphan.id.clone(), orphan.clone());

        let err = validate_script(&script).unwrap_err();
        let errors = err.validation_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, error_codes::UNUSED_STEP);
        assert_eq!(errors[0].message, "Step Orphan not used in script");
        assert_eq!(errors[0].path.as_deref(), Some(format!("steps.{}", orphan.id).as_str()));

        let unnamed = native_step("unnamed");
        let mut script = fixture.work.script().clone();
        script.steps.insert(unnamed.id.clone(), unnamed.clone());
        let err = validate_script(&script).unwrap_err();
        assert!(err.to_string().contains(&unnamed.id));
    }

    #[test]
    fn test_step_read_only_by_an_operand_is_used() {
        let source = native_step("source");
        let action = native_step("action");
        let operation = ConditionalOperation::new()
            .if_(source.output("result").unwrap(), Operator::Equal, "x")
            .then(action)
            .end();

        let mut work = DemosWork::new();
        work.push(operation);
        assert!(work.script().steps.contains_key(&source.id));
        assert!(work.validate().is_ok());
    }

    #[test]
    fn test_dangling_dependency() {
        let fixture = create_branching_work();
        let mut script = fixture.work.script().clone();
        conditional_mut(&mut script, &fixture.branch)
            .depends_on
            .push("op_missing".to_string());

        let err = validate_script(&script).unwrap_err();
        let errors = err.validation_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, error_codes::MISSING_DEPENDENCY);
        assert_eq!(
            errors[0].message,
            format!(
                "Operation {} depends on a non-existent work UID: op_missing",
                fixture.branch
            )
        );
    }

    #[test]
    fn test_dependency_outside_work_namespaces() {
        let fixture = create_branching_work();
        let mut script = fixture.work.script().clone();
        script
            .steps
            .get_mut(&fixture.check.id)
            .unwrap()
            .depends_on
            .push("tx_1".to_string());

        let err = validate_script(&script).unwrap_err();
        assert_eq!(
            codes(&err),
            vec![error_codes::INVALID_DEPENDENCY, error_codes::MISSING_DEPENDENCY]
        );
        assert_eq!(
            err.validation_errors()[0].message,
            "Step Check balance depends on an invalid work UID: tx_1"
        );
        assert_eq!(
            err.validation_errors()[1].message,
            "Step Check balance depends on a non-existent work UID: tx_1"
        );
    }

    #[test]
    fn test_existing_dependencies_pass() {
        let fixture = create_branching_work();
        let mut script = fixture.work.script().clone();
        conditional_mut(&mut script, &fixture.branch)
            .depends_on
            .push(fixture.run_check.clone());
        script
            .steps
            .get_mut(&fixture.on_success.id)
            .unwrap()
            .depends_on
            .push(fixture.check.id.clone());

        assert!(validate_script(&script).is_ok());
    }

    #[test]
    fn test_failures_are_aggregated() {
        let fixture = create_branching_work();
        let mut script = fixture.work.script().clone();
        let orphan = native_step("orphan");
        script.steps.insert(orphan.id.clone(), orphan);
        conditional_mut(&mut script, &fixture.run_check)
            .depends_on
            .push("step_ghost".to_string());

        let err = validate_script(&script).unwrap_err();
        assert_eq!(
            codes(&err),
            vec![error_codes::UNUSED_STEP, error_codes::MISSING_DEPENDENCY]
        );
        assert!(err.to_string().contains("2 issues"));
    }

    #[test]
    fn test_dangling_work_reference() {
        let fixture = create_branching_work();
        let mut script = fixture.work.script().clone();
        script.steps.remove(&fixture.on_pending.id);

        let err = validate_script(&script).unwrap_err();
        assert_eq!(codes(&err), vec![error_codes::DANGLING_REFERENCE]);
        assert!(err.to_string().contains(&fixture.on_pending.id));
    }

    #[test]
    fn test_unknown_output_field() {
        let fixture = create_branching_work();
        let mut script = fixture.work.script().clone();
        let branch = conditional_mut(&mut script, &fixture.branch);
        let first = branch.order[0].clone();
        branch.conditions.get_mut(&first).unwrap().value_a =
            Some(Operand::internal(fixture.check.id.clone(), "output.hash"));

        let err = validate_script(&script).unwrap_err();
        assert_eq!(codes(&err), vec![error_codes::UNKNOWN_OUTPUT_FIELD]);
    }

    #[test]
    fn test_unknown_operation_output_field() {
        let fixture = create_branching_work();
        let mut script = fixture.work.script().clone();
        let run_check = fixture.run_check.clone();
        let branch = conditional_mut(&mut script, &fixture.branch);
        let first = branch.order[0].clone();
        branch.conditions.get_mut(&first).unwrap().value_a =
            Some(Operand::internal(run_check.clone(), "output.bogus"));

        let err = validate_script(&script).unwrap_err();
        assert_eq!(codes(&err), vec![error_codes::UNKNOWN_OUTPUT_FIELD]);
        assert_eq!(
            err.validation_errors()[0].message,
            format!(
                "Operation {} reads unknown field 'output.bogus' of {}",
                fixture.branch, run_check
            )
        );

        for key in ["output.success", "output.matched"] {
            let branch = conditional_mut(&mut script, &fixture.branch);
            branch.conditions.get_mut(&first).unwrap().value_a =
                Some(Operand::internal(run_check.clone(), key));
            assert!(validate_script(&script).is_ok(), "{} should be readable", key);
        }
    }

    #[test]
    fn test_order_integrity() {
        let fixture = create_branching_work();

        let mut script = fixture.work.script().clone();
        script.operation_order.insert("op_ghost");
        let err = validate_script(&script).unwrap_err();
        assert_eq!(codes(&err), vec![error_codes::MISSING_OPERATION]);

        let mut script = fixture.work.script().clone();
        let stray = ConditionalOperation::new();
        script.operations.insert(
            stray.id().to_string(),
            OperationScript::Conditional(stray.script()),
        );
        let err = validate_script(&script).unwrap_err();
        assert_eq!(codes(&err), vec![error_codes::UNREACHABLE_OPERATION]);

        let mut script = fixture.work.script().clone();
        conditional_mut(&mut script, &fixture.branch)
            .order
            .push("cond_ghost".to_string());
        let err = validate_script(&script).unwrap_err();
        assert_eq!(codes(&err), vec![error_codes::MISSING_CONDITION]);
    }

    #[test]
    fn test_unsupported_operation_kind() {
        let script: DemoScript = serde_json::from_value(json!({
            "operationOrder": ["op_1"],
            "operations": {
                "op_1": { "id": "op_1", "operationType": "bogus", "depends_on": [] }
            },
            "steps": {}
        }))
        .unwrap();

        let err = validate_script(&script).unwrap_err();
        assert_eq!(codes(&err), vec![error_codes::UNSUPPORTED_OPERATION]);
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_to_json_refuses_invalid_scripts() {
        let fixture = create_branching_work();
        let mut script = fixture.work.script().clone();
        script.operation_order.insert("op_ghost");
        let work = DemosWork::from_script(script);

        assert!(matches!(work.to_json(), Err(ScriptError::Validation(_))));
        assert!(work.to_json_string().is_err());
    }

    #[test]
    fn test_custom_rules() {
        struct NoWeb2;

        impl ScriptRule for NoWeb2 {
            fn name(&self) -> &'static str {
                "no-web2"
            }

            fn check(&self, script: &DemoScript) -> Vec<ValidationError> {
                script
                    .steps
                    .iter()
                    .filter(|(_, step)| step.context == StepKind::Web2)
                    .map(|(uid, _)| ValidationError::new("ERR_NO_WEB2", format!("{} is web2", uid)))
                    .collect()
            }
        }

        let operation = ConditionalOperation::new()
            .if_condition(Condition::precomputed(true))
            .then(web2_step("https://example.com"))
            .end();
        let mut work = DemosWork::new();
        work.push(operation);

        assert!(Validator::empty().validate(work.script()).is_ok());
        let err = Validator::empty()
            .with_rule(NoWeb2)
            .validate(work.script())
            .unwrap_err();
        assert_eq!(codes(&err), vec!["ERR_NO_WEB2"]);
    }
}
