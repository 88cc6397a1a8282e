//! # DemosWork - Workflow Script Engine
//!
//! **DemosWork** composes crosschain, web2 and native steps into a single
//! conditionally branching workflow, seals it into a stable JSON script that
//! can travel inside a transaction, and executes that script by resolving the
//! data each step hands to the conditions after it.
//!
//! ## Core Workflow
//!
//! 1.  **Prepare Steps**: Wrap externally produced payloads with `prepare_xm_step`,
//!     `prepare_web2_step` or `prepare_native_step`.
//! 2.  **Build Operations**: Chain `if_` / `then` / `elif` / `else_` on a
//!     `ConditionalOperation`. A step's output (`step.output("result")`) can be
//!     an operand of any later condition; conditions nest as operands and actions.
//! 3.  **Assemble**: `push` operations into a `DemosWork`. `to_json` validates the
//!     script and produces the wire form; `from_json` restores it on the other side.
//! 4.  **Execute**: Build an `Executor` with one `StepRunner` per step kind and run
//!     the script. Every step output, condition outcome and operation summary ends
//!     up in the results map.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use demoswork::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     // 1. Steps. Their payloads come from the chain SDK or a web2 client.
//!     let transfer = prepare_native_step(json!({ "op": "transfer", "amount": 10 }))
//!         .with_description("Transfer funds");
//!     let notify = prepare_web2_step(Web2Request::new(Web2Method::Post, "https://example.com/hook"));
//!     let refund = prepare_native_step(json!({ "op": "refund" }));
//!
//!     // 2. Run the transfer unconditionally, then branch on its result.
//!     let run_transfer = ConditionalOperation::new()
//!         .if_condition(Condition::precomputed(true))
//!         .then(transfer.clone())
//!         .end();
//!     let follow_up = ConditionalOperation::new()
//!         .if_(transfer.output("result")?, Operator::Equal, "success")
//!         .then(notify)
//!         .else_(refund);
//!
//!     // 3. Assemble and seal.
//!     let mut work = DemosWork::new();
//!     work.push(run_transfer).push(follow_up);
//!     let sealed = work.to_json()?;
//!
//!     // 4. Execute on the consuming side.
//!     let mut received = DemosWork::from_json(sealed)?;
//!     let executor = Executor::builder()
//!         .with_default_runner(ReplayRunner::new().with_fallback(json!({
//!             "output": { "result": "success" }
//!         })))
//!         .build();
//!     let results = tokio_test::block_on(received.execute(&executor))?;
//!     println!("{} results", results.len());
//!     println!("{}", TraceFormatter::format_execution(received.trace()));
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod executor;
pub mod id;
pub mod operand;
pub mod operation;
pub mod prelude;
pub mod script;
pub mod step;
pub mod trace;
pub mod validator;
pub mod work;
