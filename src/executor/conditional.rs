use super::{ExecutionReport, Executor, MatchPolicy, Results, resolve};
use crate::error::ExecutionError;
use crate::id::WorkKind;
use crate::operand::{CONDITION_RESULT_KEY, Operand, Operator, is_truthy};
use crate::script::{ConditionalScript, DemoScript, OperationScript};
use crate::step::WorkStep;
use crate::trace::{ConditionRecord, ConditionTrace, ExecutionTrace};
use ahash::AHashSet;
use serde_json::{Value, json};
use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// State of one `execute` call.
pub(super) struct Run<'a> {
    executor: &'a Executor,
    script: &'a DemoScript,
    results: Results,
    trace: ExecutionTrace,
    /// Operations and conditions currently being evaluated.
    active: AHashSet<String>,
}

impl<'a> Run<'a> {
    pub(super) fn new(executor: &'a Executor, script: &'a DemoScript, results: Results) -> Self {
        Self {
            executor,
            script,
            results,
            trace: ExecutionTrace::default(),
            active: AHashSet::new(),
        }
    }

    pub(super) fn finish(self) -> ExecutionReport {
        ExecutionReport {
            results: self.results,
            trace: self.trace,
        }
    }

    fn check_depth(&self, uid: &str, depth: usize) -> Result<(), ExecutionError> {
        if depth > self.executor.max_depth {
            return Err(ExecutionError::DepthExceeded {
                work_id: uid.to_string(),
                limit: self.executor.max_depth,
            });
        }
        Ok(())
    }

    fn enter(&mut self, uid: &str) -> Result<(), ExecutionError> {
        if !self.active.insert(uid.to_string()) {
            return Err(ExecutionError::CyclicWork(uid.to_string()));
        }
        Ok(())
    }

    /// Evaluates the conditions of an operation in order and runs the work
    /// of those that hold.
    pub(super) fn run_operation<'b>(
        &'b mut self,
        uid: &'b str,
        depth: usize,
    ) -> BoxFuture<'b, Result<(), ExecutionError>> {
        Box::pin(async move {
            self.check_depth(uid, depth)?;
            let script = self.script;
            let operation = match script.operations.get(uid) {
                Some(OperationScript::Conditional(operation)) => operation,
                Some(OperationScript::Unsupported(op)) => {
                    return Err(ExecutionError::UnsupportedOperation {
                        id: uid.to_string(),
                        operation_type: op.operation_type.clone(),
                    });
                }
                None => return Err(ExecutionError::MissingOperation(uid.to_string())),
            };
            self.enter(uid)?;
            info!(
                operation = %uid,
                conditions = operation.order.len(),
                "Running conditional operation"
            );

            let mut matched = Vec::new();
            for cond_id in &operation.order {
                let entry = operation.conditions.get(cond_id).ok_or_else(|| {
                    ExecutionError::MissingCondition {
                        operation_id: uid.to_string(),
                        condition_id: cond_id.clone(),
                    }
                })?;

                let trace = self.evaluate(operation, cond_id, depth).await?;
                let holds = trace.holds();
                debug!(operation = %uid, condition = %cond_id, holds, "Evaluated condition");

                let mut ran = None;
                if holds {
                    if let Some(work) = &entry.work {
                        self.run_work(work, cond_id, depth + 1).await?;
                        ran = Some(work.clone());
                    }
                    matched.push(cond_id.clone());
                }

                self.trace.push(ConditionRecord {
                    operation_id: uid.to_string(),
                    condition_id: cond_id.clone(),
                    trace,
                    matched: holds,
                    work: ran,
                });

                if holds && self.executor.policy == MatchPolicy::FirstMatch {
                    break;
                }
            }

            self.active.remove(uid);
            self.results.insert(
                uid.to_string(),
                json!({ "output": { "success": true, "matched": matched } }),
            );
            Ok(())
        })
    }

    /// Evaluates one condition of `operation` and records its outcome under
    /// its id. Does not run the condition's work.
    fn evaluate<'b>(
        &'b mut self,
        operation: &'a ConditionalScript,
        cond_id: &'b str,
        depth: usize,
    ) -> BoxFuture<'b, Result<ConditionTrace, ExecutionError>> {
        Box::pin(async move {
            self.check_depth(cond_id, depth)?;
            let entry = operation.conditions.get(cond_id).ok_or_else(|| {
                ExecutionError::MissingCondition {
                    operation_id: operation.id.clone(),
                    condition_id: cond_id.to_string(),
                }
            })?;
            self.enter(cond_id)?;

            let trace = match (entry.operator, &entry.value_a) {
                (None, None) => ConditionTrace::Otherwise,
                (None, Some(value)) => {
                    let value = self.operand(operation, value, depth).await?;
                    let outcome = value.holds();
                    ConditionTrace::Precomputed {
                        value: Box::new(value),
                        outcome,
                    }
                }
                (Some(operator), value_a) if operator.is_unary() => {
                    let child = match value_a {
                        Some(value) => self.operand(operation, value, depth).await?,
                        None => null_leaf(),
                    };
                    let outcome = operator.apply(&child.get_outcome(), &Value::Null);
                    ConditionTrace::Unary {
                        operator,
                        child: Box::new(child),
                        outcome,
                    }
                }
                (Some(operator), value_a) => {
                    let left = match value_a {
                        Some(value) => self.operand(operation, value, depth).await?,
                        None => null_leaf(),
                    };
                    let left_value = left.get_outcome();
                    let short_circuit = match operator {
                        Operator::And => !is_truthy(&left_value),
                        Operator::Or => is_truthy(&left_value),
                        _ => false,
                    };
                    let (right, outcome) = if short_circuit {
                        (ConditionTrace::NotEvaluated, operator == Operator::Or)
                    } else {
                        let right = match &entry.value_b {
                            Some(value) => self.operand(operation, value, depth).await?,
                            None => null_leaf(),
                        };
                        let outcome = operator.apply(&left_value, &right.get_outcome());
                        (right, outcome)
                    };
                    ConditionTrace::Binary {
                        operator,
                        left: Box::new(left),
                        right: Box::new(right),
                        outcome,
                    }
                }
            };

            self.active.remove(cond_id);
            self.results.insert(
                cond_id.to_string(),
                json!({ "output": { "result": trace.holds() } }),
            );
            Ok(trace)
        })
    }

    /// Resolves an operand. References to conditions of the same operation
    /// are evaluated on the spot, and their work runs if they hold.
    fn operand<'b>(
        &'b mut self,
        operation: &'a ConditionalScript,
        operand: &'a Operand,
        depth: usize,
    ) -> BoxFuture<'b, Result<ConditionTrace, ExecutionError>> {
        Box::pin(async move {
            if let Operand::Internal {
                owner_id,
                field_key,
            } = operand
            {
                if WorkKind::of(owner_id) == Some(WorkKind::Condition)
                    && operation.conditions.contains_key(owner_id)
                {
                    if field_key != CONDITION_RESULT_KEY {
                        return Err(ExecutionError::UnresolvedField {
                            owner_id: owner_id.clone(),
                            field_key: field_key.clone(),
                        });
                    }
                    let nested = self.evaluate(operation, owner_id, depth + 1).await?;
                    if nested.holds() {
                        if let Some(work) = operation
                            .conditions
                            .get(owner_id)
                            .and_then(|entry| entry.work.as_ref())
                        {
                            self.run_work(work, owner_id, depth + 1).await?;
                        }
                    }
                    return Ok(nested);
                }
            }

            let value = resolve(operand, &self.results)?;
            let source = match operand {
                Operand::Static { value } => value.to_string(),
                internal => internal.to_string(),
            };
            Ok(ConditionTrace::Leaf { source, value })
        })
    }

    /// Runs the step or nested operation named by a condition's `work`.
    fn run_work<'b>(
        &'b mut self,
        work_id: &'b str,
        referenced_by: &'b str,
        depth: usize,
    ) -> BoxFuture<'b, Result<(), ExecutionError>> {
        Box::pin(async move {
            let missing = || ExecutionError::MissingWork {
                work_id: work_id.to_string(),
                referenced_by: referenced_by.to_string(),
            };

            let script = self.script;
            if WorkKind::of(work_id) == Some(WorkKind::Operation) {
                if !script.operations.contains_key(work_id) {
                    return Err(missing());
                }
                return self.run_operation(work_id, depth).await;
            }

            let step = script.steps.get(work_id).ok_or_else(missing)?;
            self.run_step(work_id, step).await
        })
    }

    async fn run_step(&mut self, work_id: &str, step: &'a WorkStep) -> Result<(), ExecutionError> {
        let executor = self.executor;
        let runner = executor.runner_for(step.context)?;
        let step = if step.id == work_id {
            Cow::Borrowed(step)
        } else {
            Cow::Owned(WorkStep {
                id: work_id.to_string(),
                ..step.clone()
            })
        };

        info!(step = %work_id, kind = %step.context, "Running step");
        let output = runner
            .run(&step)
            .await
            .map_err(|source| ExecutionError::Step {
                step_id: work_id.to_string(),
                source,
            })?;
        debug!(step = %work_id, output = %output, "Step completed");
        self.results.insert(work_id.to_string(), output);
        Ok(())
    }
}

fn null_leaf() -> ConditionTrace {
    ConditionTrace::Leaf {
        source: "null".to_string(),
        value: Value::Null,
    }
}
