//! The script container.
//!
//! [`DemosWork`] collects operations into a [`DemoScript`], seals it into its
//! wire form after validation, restores it on the consuming side and runs it.

mod payload;

pub use payload::{DEMOSWORK_TX_TYPE, parse_demoswork_payload, prepare_demoswork_payload};

use crate::error::{ExecutionError, ScriptError};
use crate::executor::{Executor, Results};
use crate::operation::ConditionalOperation;
use crate::script::{DemoScript, DisplayScript, OperationScript};
use crate::trace::ExecutionTrace;
use crate::validator::validate_script;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct DemosWork {
    script: DemoScript,
    results: Results,
    trace: ExecutionTrace,
}

impl DemosWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing script, e.g. one built by hand or by a generator.
    pub fn from_script(mut script: DemoScript) -> Self {
        script.restore_ids();
        Self {
            script,
            ..Self::default()
        }
    }

    /// Adds an operation and everything it collected while being built.
    ///
    /// The operation is appended to the operation order; its steps and
    /// nested operations are merged into the script's tables.
    pub fn push(&mut self, operation: impl Into<ConditionalOperation>) -> &mut Self {
        let (script, steps, operations) = operation.into().into_parts();
        let uid = script.id.clone();
        debug!(
            operation = %uid,
            steps = steps.len(),
            nested = operations.len(),
            "Pushing operation"
        );

        self.script.steps.extend(steps);
        self.script.operations.extend(operations);
        self.script
            .operations
            .insert(uid.clone(), OperationScript::Conditional(script));
        self.script.operation_order.insert(uid);
        self
    }

    pub fn script(&self) -> &DemoScript {
        &self.script
    }

    /// Results of the last [`DemosWork::execute`] call.
    pub fn results(&self) -> &Results {
        &self.results
    }

    /// Condition trace of the last [`DemosWork::execute`] call.
    pub fn trace(&self) -> &ExecutionTrace {
        &self.trace
    }

    pub fn display(&self) -> DisplayScript<'_> {
        DisplayScript {
            script: &self.script,
        }
    }

    pub fn validate(&self) -> Result<(), ScriptError> {
        validate_script(&self.script)
    }

    /// The wire form of the script. Fails without output if validation fails.
    pub fn to_json(&self) -> Result<Value, ScriptError> {
        self.validate()?;
        Ok(serde_json::to_value(&self.script)?)
    }

    pub fn to_json_string(&self) -> Result<String, ScriptError> {
        self.validate()?;
        Ok(serde_json::to_string_pretty(&self.script)?)
    }

    /// Restores a container from the wire form produced by [`DemosWork::to_json`].
    pub fn from_json(script: Value) -> Result<Self, ScriptError> {
        let script: DemoScript = serde_json::from_value(script)?;
        Ok(Self::from_script(script))
    }

    pub fn from_json_str(script: &str) -> Result<Self, ScriptError> {
        let script: DemoScript = serde_json::from_str(script)?;
        Ok(Self::from_script(script))
    }

    /// Validates and writes the script to `path` as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ScriptError> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        fs::write(path, json).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "Saved script");
        Ok(())
    }

    /// Loads a script previously written with [`DemosWork::save`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Runs the script and keeps its results and trace.
    ///
    /// The script is not validated first: a foreign or tampered script fails
    /// with a dispatch error when the executor reaches the bad entry.
    pub async fn execute(&mut self, executor: &Executor) -> Result<&Results, ExecutionError> {
        let report = executor.execute(&self.script).await?;
        self.results = report.results;
        self.trace = report.trace;
        Ok(&self.results)
    }
}
