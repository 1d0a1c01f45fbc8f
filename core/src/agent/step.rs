//! The step protocol: one JSON object per model response.
//!
//! ```json
//! { "step": "plan" | "action" | "observe" | "output",
//!   "content": "string or null",
//!   "function": "string or null",
//!   "input": <any>,
//!   "file_log": ["path (created)", ...] }
//! ```

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Plan,
    Action,
    Observe,
    Output,
}

impl StepKind {
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "plan" => Some(Self::Plan),
            "action" => Some(Self::Action),
            "observe" => Some(Self::Observe),
            "output" => Some(Self::Output),
            _ => None,
        }
    }
}

/// Wire form of a step. Serializing it reproduces the schema the model is asked to follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStep {
    pub step: StepKind,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_log: Option<Vec<String>>,
    /// Models sometimes echo observations as `{"step": "observe", "output": ...}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub name: String,
    pub input: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepBody {
    Plan { content: String },
    Action(ToolInvocation),
    Observe { content: String },
    Output { content: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub body: StepBody,
    pub file_log: Vec<String>,
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self.body {
            StepBody::Plan { .. } => StepKind::Plan,
            StepBody::Action(_) => StepKind::Action,
            StepBody::Observe { .. } => StepKind::Observe,
            StepBody::Output { .. } => StepKind::Output,
        }
    }

    /// Decodes one model response. Every failure is a typed [`ProtocolError`] so the
    /// loop can ask the model to correct itself.
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        let text = strip_code_fence(raw.trim());
        if text.is_empty() {
            return Err(ProtocolError::Empty);
        }

        let value: Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;
        let object = value.as_object().ok_or(ProtocolError::NotAnObject)?;

        let tag = match object.get("step") {
            None | Some(Value::Null) => return Err(ProtocolError::MissingField("step")),
            Some(Value::String(tag)) => tag,
            Some(other) => {
                return Err(ProtocolError::InvalidField {
                    field: "step",
                    reason: format!("expected a string, got {}", other),
                });
            }
        };
        if StepKind::parse(tag).is_none() {
            return Err(ProtocolError::UnknownStep(tag.clone()));
        }

        let raw: RawStep = serde_json::from_value(value).map_err(|e| {
            ProtocolError::InvalidField {
                field: "step object",
                reason: e.to_string(),
            }
        })?;

        Self::try_from(raw)
    }
}

impl TryFrom<RawStep> for Step {
    type Error = ProtocolError;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        let content = raw.content.unwrap_or_default();
        let body = match raw.step {
            StepKind::Plan => StepBody::Plan { content },
            StepKind::Action => {
                let name = raw
                    .function
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .ok_or(ProtocolError::MissingField("function"))?;
                StepBody::Action(ToolInvocation {
                    name,
                    input: raw.input,
                })
            }
            StepKind::Observe => {
                let content = if content.is_empty() {
                    raw.output.map(value_to_text).unwrap_or_default()
                } else {
                    content
                };
                StepBody::Observe { content }
            }
            StepKind::Output => StepBody::Output { content },
        };

        Ok(Step {
            body,
            file_log: raw.file_log.unwrap_or_default(),
        })
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Tolerates a response wrapped in a markdown code fence.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.trim()
}
