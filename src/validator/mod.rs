//! Structural checks over a finished [`DemoScript`].
//!
//! Validation is a read-only pass made of independent [`ScriptRule`]s. All
//! rules run and their findings are concatenated, so a single call reports
//! every problem at once.

mod dependencies;
mod references;
mod steps;
mod structure;

pub use dependencies::DependencyRule;
pub use references::ReferenceRule;
pub use steps::UnusedStepRule;
pub use structure::{OperationKindRule, OrderRule};

use crate::error::ScriptError;
use crate::script::DemoScript;
use std::error::Error;
use std::fmt;
use tracing::{debug, warn};

/// A single structural problem found in a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// One of the constants in [`error_codes`].
    pub code: &'static str,
    pub message: String,
    /// Location inside the script, e.g. `operations.op_1.depends_on[0]`.
    pub path: Option<String>,
}

impl ValidationError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl Error for ValidationError {}

pub mod error_codes {
    /// A step that no condition runs or reads from.
    pub const UNUSED_STEP: &str = "ERR_SCRIPT_UNUSED_STEP";

    /// A `depends_on` entry outside the step and operation namespaces.
    pub const INVALID_DEPENDENCY: &str = "ERR_SCRIPT_INVALID_DEPENDENCY";

    /// A `depends_on` entry naming work that is not in the script.
    pub const MISSING_DEPENDENCY: &str = "ERR_SCRIPT_MISSING_DEPENDENCY";

    /// A condition's `work` or operand naming something that is not in the script.
    pub const DANGLING_REFERENCE: &str = "ERR_SCRIPT_DANGLING_REFERENCE";

    /// An internal operand reading a field its owner does not expose.
    pub const UNKNOWN_OUTPUT_FIELD: &str = "ERR_SCRIPT_UNKNOWN_OUTPUT_FIELD";

    /// An `operationOrder` entry without a matching operation.
    pub const MISSING_OPERATION: &str = "ERR_SCRIPT_MISSING_OPERATION";

    /// An operation that is neither ordered nor run by any condition.
    pub const UNREACHABLE_OPERATION: &str = "ERR_SCRIPT_UNREACHABLE_OPERATION";

    /// A condition `order` entry without a matching condition.
    pub const MISSING_CONDITION: &str = "ERR_SCRIPT_MISSING_CONDITION";

    /// An operation kind this engine cannot execute.
    pub const UNSUPPORTED_OPERATION: &str = "ERR_SCRIPT_UNSUPPORTED_OPERATION";
}

/// One structural check.
pub trait ScriptRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns every violation found; an empty list means the script passes.
    fn check(&self, script: &DemoScript) -> Vec<ValidationError>;
}

/// Runs a set of rules over a script.
pub struct Validator {
    rules: Vec<Box<dyn ScriptRule>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// A validator with all built-in rules.
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(UnusedStepRule),
                Box::new(DependencyRule),
                Box::new(ReferenceRule),
                Box::new(OrderRule),
                Box::new(OperationKindRule),
            ],
        }
    }

    /// A validator with no rules, to be filled with [`Validator::with_rule`].
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: impl ScriptRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Runs every rule and concatenates their findings.
    pub fn check(&self, script: &DemoScript) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for rule in &self.rules {
            let found = rule.check(script);
            debug!(rule = rule.name(), issues = found.len(), "Ran validation rule");
            errors.extend(found);
        }
        errors
    }

    pub fn validate(&self, script: &DemoScript) -> Result<(), ScriptError> {
        let errors = self.check(script);
        if errors.is_empty() {
            return Ok(());
        }
        for err in &errors {
            warn!(code = err.code, path = ?err.path, "{}", err.message);
        }
        Err(ScriptError::Validation(errors))
    }
}

/// Validates a script with all built-in rules.
pub fn validate_script(script: &DemoScript) -> Result<(), ScriptError> {
    Validator::new().validate(script)
}
