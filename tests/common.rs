//! Common test utilities for building steps, operations and runners.
use async_trait::async_trait;
use demoswork::prelude::*;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A native step whose payload names the operation it stands for.
#[allow(dead_code)]
pub fn native_step(op: &str) -> WorkStep {
    prepare_native_step(json!({ "op": op }))
}

#[allow(dead_code)]
pub fn web2_step(url: &str) -> WorkStep {
    prepare_web2_step(
        Web2Request::new(Web2Method::Post, url).with_header("content-type", "application/json"),
    )
}

#[allow(dead_code)]
pub fn xm_step() -> WorkStep {
    let operation = XmOperation {
        chain: "eth".to_string(),
        subchain: "sepolia".to_string(),
        is_evm: true,
        rpc: None,
        task: XmTask {
            task_type: "pay".to_string(),
            params: Some(json!({ "amount": 1 })),
            signed_payloads: vec![json!("0xdeadbeef")],
        },
    };
    prepare_xm_step(XmScript::single("eth_sepolia", operation))
}

#[allow(dead_code)]
pub fn output(result: &str) -> Value {
    json!({ "output": { "result": result } })
}

/// Builds the canonical branching workflow:
///
/// - operation 1 runs `check` unconditionally,
/// - operation 2: `if check.result == "success" then on_success
///   elif check.result == "pending" then on_pending else on_other`.
#[allow(dead_code)]
pub struct Branching {
    pub work: DemosWork,
    pub check: WorkStep,
    pub on_success: WorkStep,
    pub on_pending: WorkStep,
    pub on_other: WorkStep,
    pub run_check: String,
    pub branch: String,
}

#[allow(dead_code)]
pub fn create_branching_work() -> Branching {
    let check = native_step("check").with_description("Check balance");
    let on_success = native_step("success");
    let on_pending = native_step("pending");
    let on_other = native_step("other");

    let run_check = ConditionalOperation::new()
        .if_condition(Condition::precomputed(true))
        .then(check.clone())
        .end();

    let result = check.output("result").expect("native steps expose result");
    let branch = ConditionalOperation::new()
        .if_(result.clone(), Operator::Equal, "success")
        .then(on_success.clone())
        .elif(result, Operator::Equal, "pending")
        .then(on_pending.clone())
        .else_(on_other.clone());

    let run_check_id = run_check.id().to_string();
    let branch_id = branch.id().to_string();

    let mut work = DemosWork::new();
    work.push(run_check).push(branch);

    Branching {
        work,
        check,
        on_success,
        on_pending,
        on_other,
        run_check: run_check_id,
        branch: branch_id,
    }
}

/// A runner that records the steps it ran and answers with canned outputs.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingRunner {
    pub calls: Arc<Mutex<Vec<String>>>,
    outputs: HashMap<String, Value>,
}

#[allow(dead_code)]
impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, step_id: &str, output: Value) -> Self {
        self.outputs.insert(step_id.to_string(), output);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StepRunner for RecordingRunner {
    async fn run(&self, step: &WorkStep) -> std::result::Result<Value, StepError> {
        self.calls.lock().unwrap().push(step.id.clone());
        Ok(self
            .outputs
            .get(&step.id)
            .cloned()
            .unwrap_or_else(|| output("success")))
    }
}

/// A runner whose every call fails.
#[allow(dead_code)]
pub struct FailingRunner;

#[derive(Debug)]
#[allow(dead_code)]
pub struct BroadcastError(pub String);

impl std::fmt::Display for BroadcastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "broadcast rejected: {}", self.0)
    }
}

impl std::error::Error for BroadcastError {}

#[async_trait]
impl StepRunner for FailingRunner {
    async fn run(&self, step: &WorkStep) -> std::result::Result<Value, StepError> {
        Err(Box::new(BroadcastError(step.id.clone())))
    }
}

#[allow(dead_code)]
pub fn executor_with(runner: RecordingRunner) -> Executor {
    Executor::builder().with_default_runner(runner).build()
}
