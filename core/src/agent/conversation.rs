use crate::error::ProtocolError;
use crate::traits::{ChatMessage, Role, ToolOutcome};
use serde::Serialize;

/// The loop-synthesized message that carries a tool result back to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    step: &'static str,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl Observation {
    pub fn from_outcome(outcome: &ToolOutcome) -> Self {
        match outcome {
            Ok(output) => Self {
                step: "observe",
                output: output.clone(),
                error: None,
            },
            Err(e) => Self {
                step: "observe",
                output: format!("ERROR: {}", e),
                error: Some(e.kind()),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Ordered, append-only message history. Starts with exactly one system message.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_prompt)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    /// Records the model's raw response text, before it is decoded.
    pub fn push_assistant(&mut self, raw: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(raw));
    }

    pub fn push_observation(&mut self, observation: &Observation) {
        self.messages.push(ChatMessage::user(observation.to_json()));
    }

    /// Tells the model its last response could not be decoded and what is expected instead.
    pub fn push_correction(&mut self, error: &ProtocolError) {
        self.messages.push(ChatMessage::user(format!(
            "Your last response could not be used: {}. Reply with exactly one JSON object \
             of the form {{\"step\": \"plan\"|\"action\"|\"observe\"|\"output\", \"content\": string, \
             \"function\": string, \"input\": any}}.",
            error
        )));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn system_prompt(&self) -> &str {
        &self.messages[0].content
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }
}
