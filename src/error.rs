use crate::step::StepKind;
use crate::validator::ValidationError;
use std::fmt;
use thiserror::Error;

/// The error type returned by step execution collaborators.
///
/// The engine never inspects it; it is carried unchanged inside
/// [`ExecutionError::Step`].
pub type StepError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while composing steps and operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("'{key}' is not an output of {kind} work '{work_id}' (available: {available})")]
    UnknownOutputKey {
        work_id: String,
        kind: String,
        key: String,
        available: String,
    },
}

/// Errors that can occur while validating, serializing or loading a script.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("{}", ValidationErrorsFormat(.0))]
    Validation(Vec<ValidationError>),

    #[error("Failed to (de)serialize script JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not access script file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid demoswork transaction payload: {0}")]
    InvalidPayload(String),
}

impl ScriptError {
    /// The individual validation failures, if this is a validation error.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            ScriptError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

struct ValidationErrorsFormat<'a>(&'a [ValidationError]);

impl fmt::Display for ValidationErrorsFormat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script validation failed ({} issues):", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            write!(f, "\n  {}. {}", i + 1, err)?;
        }
        Ok(())
    }
}

/// Errors that can occur while executing a script.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Operation '{0}' is listed in the operation order but not found in the script")]
    MissingOperation(String),

    #[error("Operation '{id}' has an unsupported operation type: '{operation_type}'")]
    UnsupportedOperation { id: String, operation_type: String },

    #[error("Condition '{condition_id}' is not defined in operation '{operation_id}'")]
    MissingCondition {
        operation_id: String,
        condition_id: String,
    },

    #[error("Work '{work_id}' referenced by '{referenced_by}' is not defined in the script")]
    MissingWork {
        work_id: String,
        referenced_by: String,
    },

    #[error("Work '{0}' was re-entered while still executing")]
    CyclicWork(String),

    #[error("Nesting depth limit of {limit} exceeded while executing '{work_id}'")]
    DepthExceeded { work_id: String, limit: usize },

    #[error("Reference to '{owner_id}' cannot be resolved: it has not produced a result yet")]
    UnresolvedReference { owner_id: String },

    #[error("Field '{field_key}' does not exist on the result of '{owner_id}'")]
    UnresolvedField { owner_id: String, field_key: String },

    #[error("No step runner registered for {0} steps")]
    NoRunner(StepKind),

    #[error("Step '{step_id}' failed: {source}")]
    Step {
        step_id: String,
        #[source]
        source: StepError,
    },
}
