//! Runs a script against pluggable step collaborators.
//!
//! The executor walks `operationOrder` sequentially. For each conditional
//! operation it evaluates conditions in their declared order and runs the
//! work of those that hold, awaiting every step before moving on. Results
//! are written into a map keyed by UID, from which later internal operands
//! are resolved.

mod conditional;
mod replay;
mod resolve;

pub use replay::ReplayRunner;
pub use resolve::resolve;

use crate::error::{ExecutionError, StepError};
use crate::script::DemoScript;
use crate::step::{StepKind, WorkStep};
use crate::trace::ExecutionTrace;
use ahash::AHashMap;
use async_trait::async_trait;
use conditional::Run;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Results of a run: step outputs, condition outcomes and operation summaries by UID.
pub type Results = AHashMap<String, Value>;

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Executes one kind of step: a crosschain broadcast, a web2 request, a native op.
///
/// The returned value is stored verbatim as the step's result and is expected
/// to look like `{ "output": { .. } }`. Errors are passed through unchanged.
#[async_trait]
pub trait StepRunner: Send + Sync {
    async fn run(&self, step: &WorkStep) -> Result<Value, StepError>;
}

/// Which matching conditions of an operation get their work run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Every condition is evaluated and every match runs, else-branches included.
    #[default]
    All,
    /// Evaluation of an operation stops after its first match.
    FirstMatch,
}

/// The outcome of a successful run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub results: Results,
    pub trace: ExecutionTrace,
}

pub struct ExecutorBuilder {
    runners: AHashMap<StepKind, Arc<dyn StepRunner>>,
    default_runner: Option<Arc<dyn StepRunner>>,
    policy: MatchPolicy,
    max_depth: usize,
}

impl Default for ExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutorBuilder {
    pub fn new() -> Self {
        Self {
            runners: AHashMap::new(),
            default_runner: None,
            policy: MatchPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Registers the runner for one step kind, replacing any previous one.
    pub fn with_runner(mut self, kind: StepKind, runner: impl StepRunner + 'static) -> Self {
        self.runners.insert(kind, Arc::new(runner));
        self
    }

    pub fn with_shared_runner(mut self, kind: StepKind, runner: Arc<dyn StepRunner>) -> Self {
        self.runners.insert(kind, runner);
        self
    }

    /// Runner used for kinds without a dedicated one.
    pub fn with_default_runner(mut self, runner: impl StepRunner + 'static) -> Self {
        self.default_runner = Some(Arc::new(runner));
        self
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Limit on nested operations and condition references.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn build(self) -> Executor {
        Executor {
            runners: self.runners,
            default_runner: self.default_runner,
            policy: self.policy,
            max_depth: self.max_depth,
        }
    }
}

pub struct Executor {
    runners: AHashMap<StepKind, Arc<dyn StepRunner>>,
    default_runner: Option<Arc<dyn StepRunner>>,
    policy: MatchPolicy,
    max_depth: usize,
}

impl Executor {
    pub fn builder() -> ExecutorBuilder {
        ExecutorBuilder::new()
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub(crate) fn runner_for(&self, kind: StepKind) -> Result<&dyn StepRunner, ExecutionError> {
        self.runners
            .get(&kind)
            .or(self.default_runner.as_ref())
            .map(Arc::as_ref)
            .ok_or(ExecutionError::NoRunner(kind))
    }

    /// Runs every operation of `script` in order, starting from empty results.
    pub async fn execute(&self, script: &DemoScript) -> Result<ExecutionReport, ExecutionError> {
        self.execute_with(script, Results::new()).await
    }

    /// Runs every operation of `script` in order on top of existing results.
    ///
    /// The first error aborts the run; work that already ran is not undone.
    pub async fn execute_with(
        &self,
        script: &DemoScript,
        results: Results,
    ) -> Result<ExecutionReport, ExecutionError> {
        info!(
            operations = script.operation_order.len(),
            steps = script.steps.len(),
            policy = ?self.policy,
            "Executing script"
        );

        let mut run = Run::new(self, script, results);
        for uid in script.operation_order.iter() {
            if !script.operations.contains_key(uid) {
                return Err(ExecutionError::MissingOperation(uid.clone()));
            }
            run.run_operation(uid, 0).await?;
        }

        let report = run.finish();
        info!(results = report.results.len(), "Script executed");
        Ok(report)
    }
}
