//! Helpers that wrap externally produced payloads into work steps.

use super::content::{StepContent, Web2Request, XmScript};
use super::workstep::WorkStep;
use serde_json::Value;

/// Wraps a crosschain script (already signed by the chain SDK) into a step.
pub fn prepare_xm_step(script: XmScript) -> WorkStep {
    WorkStep::new(StepContent::Xm(script))
}

/// Wraps a web2 request into a step.
pub fn prepare_web2_step(request: Web2Request) -> WorkStep {
    WorkStep::new(StepContent::Web2(request))
}

/// Wraps a native operation payload into a step.
pub fn prepare_native_step(payload: Value) -> WorkStep {
    WorkStep::new(StepContent::Native(payload))
}
