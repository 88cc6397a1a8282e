//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the demoswork crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use demoswork::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let work = DemosWork::from_file("path/to/script.json")?;
//! work.validate()?;
//! println!("{}", work.display());
//! # Ok(())
//! # }
//! ```

// Building
pub use crate::operand::{Operand, Operator};
pub use crate::operation::{
    AwaitingElifOrElse, AwaitingThen, Condition, ConditionValue, ConditionalOperation,
    OutputRef, WorkUnit,
};
pub use crate::step::{
    StepContent, StepKind, Web2Method, Web2Request, WorkStep, XmOperation, XmScript, XmTask,
    prepare_native_step, prepare_web2_step, prepare_xm_step,
};

// Scripts
pub use crate::script::{DemoScript, DisplayScript, OperationScript};
pub use crate::validator::{ValidationError, Validator, validate_script};
pub use crate::work::{DemosWork, parse_demoswork_payload, prepare_demoswork_payload};

// Execution
pub use crate::executor::{
    ExecutionReport, Executor, MatchPolicy, ReplayRunner, Results, StepRunner,
};
pub use crate::trace::{ExecutionTrace, TraceFormatter};

// Error types
pub use crate::error::{BuildError, ExecutionError, ScriptError, StepError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
