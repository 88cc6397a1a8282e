//! Work identifiers.
//!
//! Every step, operation and condition gets a process-unique UID made of a
//! namespace prefix and a UUID v4. The prefix is what lets the validator and
//! the executor tell, from a bare string, which table an identifier lives in.

use std::fmt;
use uuid::Uuid;

pub const STEP_PREFIX: &str = "step_";
pub const OPERATION_PREFIX: &str = "op_";
pub const CONDITION_PREFIX: &str = "cond_";

/// The namespace an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkKind {
    Step,
    Operation,
    Condition,
}

impl WorkKind {
    /// Classifies a UID by its prefix. Returns `None` for foreign identifiers.
    pub fn of(uid: &str) -> Option<WorkKind> {
        if uid.starts_with(STEP_PREFIX) {
            Some(WorkKind::Step)
        } else if uid.starts_with(OPERATION_PREFIX) {
            Some(WorkKind::Operation)
        } else if uid.starts_with(CONDITION_PREFIX) {
            Some(WorkKind::Condition)
        } else {
            None
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            WorkKind::Step => STEP_PREFIX,
            WorkKind::Operation => OPERATION_PREFIX,
            WorkKind::Condition => CONDITION_PREFIX,
        }
    }

    /// Generates a fresh UID in this namespace.
    pub fn new_uid(&self) -> String {
        format!("{}{}", self.prefix(), Uuid::new_v4())
    }
}

impl fmt::Display for WorkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkKind::Step => write!(f, "Step"),
            WorkKind::Operation => write!(f, "Operation"),
            WorkKind::Condition => write!(f, "Condition"),
        }
    }
}

/// True if `uid` may appear in a `depends_on` list (steps and operations only).
pub fn is_work_uid(uid: &str) -> bool {
    matches!(
        WorkKind::of(uid),
        Some(WorkKind::Step) | Some(WorkKind::Operation)
    )
}
