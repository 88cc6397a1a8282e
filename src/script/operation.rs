use crate::operand::{Operand, Operator};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

pub const CONDITIONAL_OPERATION: &str = "conditional";

/// One row of a conditional operation's flat condition table.
///
/// `operator == None` with no `value_a` is an else-branch; with a `value_a`
/// it is a pre-computed condition decided by that operand's truthiness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub operator: Option<Operator>,
    pub value_a: Option<Operand>,
    pub value_b: Option<Operand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
}

impl ConditionEntry {
    pub fn is_else(&self) -> bool {
        self.operator.is_none() && self.value_a.is_none()
    }

    /// Owner UIDs of the `Internal` operands of this entry.
    pub fn referenced_owners(&self) -> impl Iterator<Item = &str> {
        [self.value_a.as_ref(), self.value_b.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(Operand::owner_id)
    }
}

fn default_critical() -> bool {
    true
}

/// The wire form of a conditional operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalScript {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_critical")]
    pub critical: bool,
    #[serde(default)]
    pub depends_on: Vec<String>,
    pub conditions: BTreeMap<String, ConditionEntry>,
    pub order: Vec<String>,
}

/// An operation whose `operationType` this engine does not implement.
///
/// Kept verbatim so that loading a foreign script succeeds and the
/// executor, not the parser, reports the dispatch failure.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedOperation {
    pub id: String,
    pub operation_type: String,
    pub body: Value,
}

/// Any entry of a script's operation table.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationScript {
    Conditional(ConditionalScript),
    Unsupported(UnsupportedOperation),
}

impl OperationScript {
    pub fn id(&self) -> &str {
        match self {
            OperationScript::Conditional(script) => &script.id,
            OperationScript::Unsupported(op) => &op.id,
        }
    }

    pub(crate) fn set_id(&mut self, uid: &str) {
        match self {
            OperationScript::Conditional(script) => script.id = uid.to_string(),
            OperationScript::Unsupported(op) => op.id = uid.to_string(),
        }
    }

    pub fn operation_type(&self) -> &str {
        match self {
            OperationScript::Conditional(_) => CONDITIONAL_OPERATION,
            OperationScript::Unsupported(op) => &op.operation_type,
        }
    }

    pub fn depends_on(&self) -> Vec<&str> {
        match self {
            OperationScript::Conditional(script) => {
                script.depends_on.iter().map(String::as_str).collect()
            }
            OperationScript::Unsupported(op) => op
                .body
                .get("depends_on")
                .and_then(Value::as_array)
                .map(|deps| deps.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default(),
        }
    }

    pub fn as_conditional(&self) -> Option<&ConditionalScript> {
        match self {
            OperationScript::Conditional(script) => Some(script),
            OperationScript::Unsupported(_) => None,
        }
    }
}

#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "operationType")]
    operation_type: &'a str,
    #[serde(flatten)]
    script: &'a T,
}

impl Serialize for OperationScript {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OperationScript::Conditional(script) => Tagged {
                operation_type: CONDITIONAL_OPERATION,
                script,
            }
            .serialize(serializer),
            OperationScript::Unsupported(op) => op.body.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for OperationScript {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let body = Value::deserialize(deserializer)?;
        let operation_type = body
            .get("operationType")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("operationType"))?
            .to_string();

        if operation_type == CONDITIONAL_OPERATION {
            return serde_json::from_value(body)
                .map(OperationScript::Conditional)
                .map_err(D::Error::custom);
        }

        let id = body
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(OperationScript::Unsupported(UnsupportedOperation {
            id,
            operation_type,
            body,
        }))
    }
}
