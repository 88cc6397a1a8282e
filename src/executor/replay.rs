use super::StepRunner;
use crate::error::{ScriptError, StepError};
use crate::step::WorkStep;
use ahash::AHashMap;
use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// A runner that answers with recorded outputs instead of touching a chain
/// or the network. Used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct ReplayRunner {
    outputs: AHashMap<String, Value>,
    fallback: Option<Value>,
}

impl ReplayRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outputs(outputs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            outputs: outputs.into_iter().collect(),
            fallback: None,
        }
    }

    /// Loads outputs from a JSON object mapping step UIDs to their results.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let outputs: AHashMap<String, Value> = serde_json::from_str(&content)?;
        Ok(Self {
            outputs,
            fallback: None,
        })
    }

    pub fn with_output(mut self, step_id: impl Into<String>, output: Value) -> Self {
        self.outputs.insert(step_id.into(), output);
        self
    }

    /// Output returned for steps without a recorded one.
    pub fn with_fallback(mut self, output: Value) -> Self {
        self.fallback = Some(output);
        self
    }
}

#[async_trait]
impl StepRunner for ReplayRunner {
    async fn run(&self, step: &WorkStep) -> Result<Value, StepError> {
        self.outputs
            .get(&step.id)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| format!("no recorded output for step '{}'", step.id).into())
    }
}
