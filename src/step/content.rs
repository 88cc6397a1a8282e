use super::workstep::StepKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// The payload a step carries. The engine only wraps it; producing and
/// signing it is the job of the chain SDK or web2 client.
///
/// On the wire the payload is written bare. Which variant it decodes into is
/// decided by the step's `context`, never by the payload's shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepContent {
    Xm(XmScript),
    Web2(Web2Request),
    Native(Value),
}

impl StepContent {
    /// Decodes a bare payload as the content of a `kind` step.
    pub fn decode(kind: StepKind, payload: Value) -> Result<Self, serde_json::Error> {
        match kind {
            StepKind::Xm => serde_json::from_value(payload).map(StepContent::Xm),
            StepKind::Web2 => serde_json::from_value(payload).map(StepContent::Web2),
            StepKind::Native => Ok(StepContent::Native(payload)),
        }
    }

    /// The step kind this content belongs to.
    pub fn kind(&self) -> StepKind {
        match self {
            StepContent::Xm(_) => StepKind::Xm,
            StepContent::Web2(_) => StepKind::Web2,
            StepContent::Native(_) => StepKind::Native,
        }
    }
}

/// A crosschain payload: one or more chain operations and the order to run them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmScript {
    pub operations: BTreeMap<String, XmOperation>,
    pub operations_order: Vec<String>,
}

impl XmScript {
    /// Creates a script holding a single chain operation under `uid`.
    pub fn single(uid: impl Into<String>, operation: XmOperation) -> Self {
        let uid = uid.into();
        Self {
            operations: BTreeMap::from([(uid.clone(), operation)]),
            operations_order: vec![uid],
        }
    }
}

/// A single operation on one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmOperation {
    pub chain: String,
    pub subchain: String,
    pub is_evm: bool,
    #[serde(default)]
    pub rpc: Option<String>,
    pub task: XmTask,
}

/// What to do on the chain, with the pre-signed payloads produced by the chain SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmTask {
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(rename = "signedPayloads", default)]
    pub signed_payloads: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Web2Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Web2Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Web2Method::Get => "GET",
            Web2Method::Post => "POST",
            Web2Method::Put => "PUT",
            Web2Method::Patch => "PATCH",
            Web2Method::Delete => "DELETE",
        };
        write!(f, "{}", name)
    }
}

fn default_min_attestations() -> u32 {
    2
}

/// An attested web2 HTTP request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Web2Request {
    pub action: Web2Method,
    pub url: String,
    #[serde(default)]
    pub parameters: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(rename = "minAttestations", default = "default_min_attestations")]
    pub min_attestations: u32,
}

impl Web2Request {
    pub fn new(action: Web2Method, url: impl Into<String>) -> Self {
        Self {
            action,
            url: url.into(),
            parameters: Vec::new(),
            headers: None,
            min_attestations: default_min_attestations(),
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<Value>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_min_attestations(mut self, min_attestations: u32) -> Self {
        self.min_attestations = min_attestations;
        self
    }
}
