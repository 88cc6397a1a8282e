//! Operations and the conditions they are built from.
//!
//! A [`ConditionalOperation`] is composed with a small typed state machine
//! (`if_` → `then` → `elif`/`else_`/`end`). Conditions may nest, both as
//! actions and as operands; [`lower_condition`] flattens such a tree into the
//! table of [`ConditionEntry`](crate::script::ConditionEntry) rows the script
//! stores.

mod condition;
mod conditional;
mod lowering;

pub use condition::*;
pub use conditional::*;
pub use lowering::{LoweredCondition, lower_condition};
