use super::DemosWork;
use crate::error::ScriptError;
use serde_json::{Value, json};

/// Transaction type under which sealed scripts travel.
pub const DEMOSWORK_TX_TYPE: &str = "demoswork";

/// The `data` field of a demoswork transaction: `["demoswork", <script>]`.
///
/// Signing and broadcasting the transaction is left to the caller.
pub fn prepare_demoswork_payload(work: &DemosWork) -> Result<Value, ScriptError> {
    Ok(json!([DEMOSWORK_TX_TYPE, work.to_json()?]))
}

/// Extracts the script from a demoswork transaction `data` field.
pub fn parse_demoswork_payload(data: &Value) -> Result<DemosWork, ScriptError> {
    let items = data
        .as_array()
        .ok_or_else(|| ScriptError::InvalidPayload("expected a two-element array".to_string()))?;
    match items.as_slice() {
        [Value::String(tx_type), script] if tx_type == DEMOSWORK_TX_TYPE => {
            DemosWork::from_json(script.clone())
        }
        [Value::String(tx_type), _] => Err(ScriptError::InvalidPayload(format!(
            "unexpected transaction type '{}'",
            tx_type
        ))),
        _ => Err(ScriptError::InvalidPayload(
            "expected [\"demoswork\", <script>]".to_string(),
        )),
    }
}
