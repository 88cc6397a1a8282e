//! Integration tests for DemosWork
//!
//! End-to-end tests that verify building, sealing, transporting and running a script.
//!
mod common;
use common::*;
use demoswork::prelude::*;
use serde_json::json;
use std::fs;
use tokio_test::block_on;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_the_script() {
        let fixture = create_branching_work();
        let wire = fixture.work.to_json().expect("valid script serializes");

        let restored = DemosWork::from_json(wire.clone()).expect("wire form parses");
        assert_eq!(restored.script(), fixture.work.script());
        assert_eq!(restored.to_json().unwrap(), wire);
    }

    #[test]
    fn test_native_content_keeps_its_kind_through_transport() {
        let lookalike = prepare_native_step(json!({ "action": "GET", "url": "https://x" }));
        let xm_lookalike = prepare_native_step(json!({
            "operations": {},
            "operations_order": []
        }));
        let mut work = DemosWork::new();
        work.push(
            ConditionalOperation::new()
                .if_condition(Condition::precomputed(true))
                .then(lookalike.clone())
                .elif_condition(Condition::precomputed(true))
                .then(xm_lookalike.clone())
                .end(),
        );

        let wire = work.to_json().unwrap();
        assert_eq!(
            wire["steps"][&lookalike.id]["content"],
            json!({ "action": "GET", "url": "https://x" })
        );

        let restored = DemosWork::from_json(wire.clone()).unwrap();
        assert_eq!(restored.script(), work.script());
        assert!(matches!(
            restored.script().steps[&lookalike.id].content,
            StepContent::Native(_)
        ));
        assert!(matches!(
            restored.script().steps[&xm_lookalike.id].content,
            StepContent::Native(_)
        ));
        assert_eq!(restored.to_json().unwrap(), wire);
    }

    #[test]
    fn test_content_not_matching_its_context_is_rejected() {
        let fixture = create_branching_work();
        let mut wire = fixture.work.to_json().unwrap();
        wire["steps"][&fixture.check.id]["context"] = json!("web2");

        let err = DemosWork::from_json(wire).unwrap_err();
        assert!(matches!(err, ScriptError::Json(_)));
        assert!(err.to_string().contains("invalid content for a web2 step"));
    }

    #[test]
    fn test_wire_shape() {
        let fixture = create_branching_work();
        let wire = fixture.work.to_json().unwrap();

        assert_eq!(
            wire["operationOrder"],
            json!([fixture.run_check, fixture.branch])
        );

        let branch = &wire["operations"][&fixture.branch];
        assert_eq!(branch["id"], json!(fixture.branch));
        assert_eq!(branch["operationType"], json!("conditional"));
        assert_eq!(branch["critical"], json!(true));
        assert_eq!(branch["depends_on"], json!([]));
        assert_eq!(branch["order"].as_array().unwrap().len(), 3);

        let first = &branch["order"][0];
        let condition = &branch["conditions"][first.as_str().unwrap()];
        assert_eq!(condition["operator"], json!("=="));
        assert_eq!(
            condition["value_a"],
            json!({ "type": "internal", "workUID": fixture.check.id, "key": "output.result" })
        );
        assert_eq!(condition["value_b"], json!({ "type": "static", "value": "success" }));
        assert_eq!(condition["work"], json!(fixture.on_success.id));

        let step = &wire["steps"][&fixture.check.id];
        assert!(step.get("id").is_none());
        assert_eq!(step["context"], json!("native"));
    }

    #[test]
    fn test_order_is_kept_regardless_of_map_order() {
        let check = native_step("check");
        let result = check.output("result").unwrap();
        let mut chain = ConditionalOperation::new()
            .if_(result.clone(), Operator::Equal, 0)
            .then(native_step("branch-0"));
        for i in 1..12 {
            chain = chain
                .elif(result.clone(), Operator::Equal, i)
                .then(native_step(&format!("branch-{}", i)));
        }
        let operation = chain.else_(native_step("else"));
        let expected = operation.order().to_vec();

        let mut work = DemosWork::new();
        work.push(
            ConditionalOperation::new()
                .if_condition(Condition::precomputed(true))
                .then(check)
                .end(),
        );
        work.push(operation);

        let restored = DemosWork::from_json_str(&work.to_json_string().unwrap()).unwrap();
        let uid = &restored.script().operation_order.as_slice()[1];
        let order = &restored.script().operations[uid].as_conditional().unwrap().order;
        assert_eq!(order, &expected);
    }

    #[test]
    fn test_transaction_payload() {
        let fixture = create_branching_work();
        let payload = prepare_demoswork_payload(&fixture.work).unwrap();

        assert_eq!(payload[0], json!("demoswork"));
        assert_eq!(payload[1], fixture.work.to_json().unwrap());

        let received = parse_demoswork_payload(&payload).unwrap();
        assert_eq!(received.script(), fixture.work.script());

        let wrong_type = json!(["native", payload[1].clone()]);
        assert!(matches!(
            parse_demoswork_payload(&wrong_type),
            Err(ScriptError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_demoswork_payload(&json!({ "type": "demoswork" })),
            Err(ScriptError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let fixture = create_branching_work();
        let path = std::env::temp_dir().join(format!("demoswork-{}.json", fixture.branch));

        fixture.work.save(&path).expect("script saves");
        let loaded = DemosWork::from_file(&path).expect("script loads");
        fs::remove_file(&path).ok();

        assert_eq!(loaded.script(), fixture.work.script());

        let missing = DemosWork::from_file(&path);
        assert!(matches!(missing, Err(ScriptError::Io { .. })));
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let err = DemosWork::from_json_str("{ \"operationOrder\": [").unwrap_err();
        assert!(matches!(err, ScriptError::Json(_)));

        let err = DemosWork::from_json(json!({ "operationOrder": ["op_a", "op_a"] })).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_end_to_end_run_after_transport() {
        let fixture = create_branching_work();
        let payload = prepare_demoswork_payload(&fixture.work).unwrap();
        let mut received = parse_demoswork_payload(&payload).unwrap();

        let runner = RecordingRunner::new().with_output(&fixture.check.id, output("failed"));
        let executor = executor_with(runner.clone());
        block_on(received.execute(&executor)).unwrap();

        assert_eq!(
            runner.calls(),
            vec![fixture.check.id.clone(), fixture.on_other.id.clone()]
        );
        assert_eq!(received.results()[&fixture.check.id], output("failed"));
    }

    #[test]
    fn test_mixed_step_kinds() {
        let payment = xm_step().with_description("Pay on sepolia");
        let hook = web2_step("https://example.com/paid");
        let operation = ConditionalOperation::new()
            .if_(payment.output("hash").unwrap(), Operator::NotEqual, json!(null))
            .then(hook.clone())
            .end();
        let pay = ConditionalOperation::new()
            .if_condition(Condition::precomputed(true))
            .then(payment.clone())
            .end();

        let mut work = DemosWork::new();
        work.push(pay).push(operation);
        assert!(work.validate().is_ok());

        let xm = RecordingRunner::new().with_output(
            &payment.id,
            json!({ "output": { "result": "success", "hash": "0xabc" } }),
        );
        let web2 = RecordingRunner::new().with_output(
            &hook.id,
            json!({ "output": { "statusCode": 200, "payload": { "ok": true } } }),
        );
        let executor = Executor::builder()
            .with_runner(StepKind::Xm, xm.clone())
            .with_runner(StepKind::Web2, web2.clone())
            .build();

        let results = block_on(work.execute(&executor)).unwrap();
        assert_eq!(results[&hook.id]["output"]["statusCode"], json!(200));
        assert_eq!(xm.calls(), vec![payment.id.clone()]);
        assert_eq!(web2.calls(), vec![hook.id.clone()]);
    }

    #[test]
    fn test_display_lists_the_tree() {
        let inner = ConditionalOperation::new()
            .if_condition(Condition::precomputed(true))
            .then(native_step("inner").with_description("Inner step"))
            .end();
        let inner_id = inner.id().to_string();
        let outer = ConditionalOperation::new()
            .if_(Condition::new(1, Operator::SmallerThan, 2), Operator::Or, false)
            .then(inner)
            .else_(native_step("fallback"));

        let mut work = DemosWork::new();
        work.push(outer);
        let text = work.display().to_string();

        assert!(text.starts_with("DemoScript (2 operations, 2 steps)"));
        assert!(text.contains("if (1 < 2) || false"));
        assert!(text.contains(&format!("{} (conditional, critical)", inner_id)));
        assert!(text.contains("\"Inner step\""));
        assert!(text.contains("└── else"));
    }
}
