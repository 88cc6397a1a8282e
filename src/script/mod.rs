mod display;
mod operation;
mod order;

pub use display::DisplayScript;
pub use operation::*;
pub use order::OperationOrder;

use crate::id::WorkKind;
use crate::step::WorkStep;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The flattened, serializable form of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemoScript {
    #[serde(rename = "operationOrder")]
    pub operation_order: OperationOrder,
    #[serde(default)]
    pub operations: BTreeMap<String, OperationScript>,
    #[serde(default)]
    pub steps: BTreeMap<String, WorkStep>,
}

impl DemoScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies map keys back into the `id` fields that the wire form omits.
    pub fn restore_ids(&mut self) {
        for (uid, step) in self.steps.iter_mut() {
            step.id = uid.clone();
        }
        for (uid, operation) in self.operations.iter_mut() {
            operation.set_id(uid);
        }
    }

    /// True if `uid` names a step or an operation of this script.
    pub fn contains_work(&self, uid: &str) -> bool {
        match WorkKind::of(uid) {
            Some(WorkKind::Step) => self.steps.contains_key(uid),
            Some(WorkKind::Operation) => self.operations.contains_key(uid),
            _ => self.steps.contains_key(uid) || self.operations.contains_key(uid),
        }
    }

    /// Conditional operations paired with their UIDs.
    pub fn conditionals(&self) -> impl Iterator<Item = (&String, &ConditionalScript)> {
        self.operations
            .iter()
            .filter_map(|(uid, operation)| operation.as_conditional().map(|c| (uid, c)))
    }
}
