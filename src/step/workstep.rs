use super::content::StepContent;
use crate::error::BuildError;
use crate::id::WorkKind;
use crate::operation::{OutputRef, WorkUnit};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which execution collaborator a step is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Xm,
    Web2,
    Native,
}

impl StepKind {
    /// The output fields a step of this kind exposes to later conditions.
    pub fn output_keys(&self) -> &'static [&'static str] {
        match self {
            StepKind::Xm => &["result", "hash"],
            StepKind::Web2 => &["statusCode", "payload"],
            StepKind::Native => &["result"],
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Xm => write!(f, "xm"),
            StepKind::Web2 => write!(f, "web2"),
            StepKind::Native => write!(f, "native"),
        }
    }
}

/// The atomic unit of execution.
///
/// The `id` is not part of the wire form: inside a script a step is keyed by
/// its id, and loading a script restores the field from that key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWorkStep")]
pub struct WorkStep {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub context: StepKind,
    pub content: StepContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub timestamp: i64,
}

/// Wire form of a step before its content is decoded against `context`.
#[derive(Deserialize)]
struct RawWorkStep {
    #[serde(default)]
    id: String,
    context: StepKind,
    content: Value,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    depends_on: Vec<String>,
    #[serde(default)]
    timestamp: i64,
}

impl TryFrom<RawWorkStep> for WorkStep {
    type Error = String;

    fn try_from(raw: RawWorkStep) -> Result<Self, Self::Error> {
        let content = StepContent::decode(raw.context, raw.content)
            .map_err(|e| format!("invalid content for a {} step: {}", raw.context, e))?;
        Ok(Self {
            id: raw.id,
            context: raw.context,
            content,
            description: raw.description,
            depends_on: raw.depends_on,
            timestamp: raw.timestamp,
        })
    }
}

impl WorkStep {
    /// Creates a step whose kind is that of its content.
    pub fn new(content: StepContent) -> Self {
        Self {
            id: WorkKind::Step.new_uid(),
            context: content.kind(),
            content,
            description: None,
            depends_on: Vec::new(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Records that this step must not run before `uid`.
    pub fn add_dependency(&mut self, uid: impl Into<String>) {
        self.depends_on.push(uid.into());
    }

    /// A reference to one of this step's output fields, usable as a condition operand.
    ///
    /// Accepts both `"result"` and `"output.result"`.
    pub fn output(&self, key: &str) -> Result<OutputRef, BuildError> {
        let field = key.strip_prefix("output.").unwrap_or(key);
        let available = self.context.output_keys();
        if !available.contains(&field) {
            return Err(BuildError::UnknownOutputKey {
                work_id: self.id.clone(),
                kind: self.context.to_string(),
                key: key.to_string(),
                available: available.join(", "),
            });
        }
        Ok(OutputRef::new(
            WorkUnit::Step(self.clone()),
            format!("output.{}", field),
        ))
    }

    /// The name used for this step in human-facing messages.
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.id)
    }
}
