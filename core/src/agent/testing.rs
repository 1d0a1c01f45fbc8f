//! Test doubles for the provider, tools and operator.

use crate::agent::operator::{Operator, OperatorInput, TurnEvent};
use crate::error::AgentError;
use crate::traits::{
    ChatRequest, ChatResponse, ConfirmationRequest, Provider, Tool, ToolOutcome,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays canned responses in order and remembers what it was asked.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<(usize, bool)>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Conversation length at each call.
    pub fn seen_lengths(&self) -> Vec<usize> {
        self.seen.lock().unwrap().iter().map(|(len, _)| *len).collect()
    }

    pub fn all_json_mode(&self) -> bool {
        self.seen.lock().unwrap().iter().all(|(_, json)| *json)
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        self.seen
            .lock()
            .unwrap()
            .push((request.messages.len(), request.json_mode));

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(text) => Ok(ChatResponse { text: Some(text) }),
            None => Err(anyhow::anyhow!("script exhausted")),
        }
    }
}

pub struct StubTool {
    name: String,
    outcome: ToolOutcome,
    confirmation: Option<ConfirmationRequest>,
    calls: Arc<Mutex<Vec<Value>>>,
}

impl StubTool {
    pub fn ok(name: &str, output: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: Ok(output.to_string()),
            confirmation: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_confirmation(mut self, request: ConfirmationRequest) -> Self {
        self.confirmation = Some(request);
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<Value>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "stub"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "string"})
    }

    async fn confirmation(&self, _input: &Value) -> Option<ConfirmationRequest> {
        self.confirmation.clone()
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        self.calls.lock().unwrap().push(input);
        self.outcome.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Plan(String),
    Observe(String),
    ToolCall(String, Value),
    ToolResult(String, ToolOutcome),
    Retry(String, usize),
    Output(String, Vec<String>),
}

/// Feeds scripted input lines and records everything the loop shows.
#[derive(Default)]
pub struct RecordingOperator {
    inputs: VecDeque<OperatorInput>,
    confirmations: VecDeque<bool>,
    pub events: Vec<Recorded>,
    pub confirm_requests: Vec<ConfirmationRequest>,
    pub failures: Vec<String>,
    pub reads: usize,
}

impl RecordingOperator {
    pub fn with_inputs<I: IntoIterator<Item = OperatorInput>>(mut self, inputs: I) -> Self {
        self.inputs = inputs.into_iter().collect();
        self
    }

    pub fn with_confirmations<I: IntoIterator<Item = bool>>(mut self, answers: I) -> Self {
        self.confirmations = answers.into_iter().collect();
        self
    }
}

impl Operator for RecordingOperator {
    fn read_input(&mut self) -> OperatorInput {
        self.reads += 1;
        self.inputs.pop_front().unwrap_or(OperatorInput::Closed)
    }

    fn on_event(&mut self, event: TurnEvent<'_>) {
        let recorded = match event {
            TurnEvent::Plan(content) => Recorded::Plan(content.to_string()),
            TurnEvent::Observe(content) => Recorded::Observe(content.to_string()),
            TurnEvent::ToolCall { name, input } => Recorded::ToolCall(name.to_string(), input.clone()),
            TurnEvent::ToolResult { name, outcome } => {
                Recorded::ToolResult(name.to_string(), outcome.clone())
            }
            TurnEvent::ProtocolRetry { error, attempt } => {
                Recorded::Retry(error.to_string(), attempt)
            }
            TurnEvent::Output { content, file_log } => {
                Recorded::Output(content.to_string(), file_log.to_vec())
            }
        };
        self.events.push(recorded);
    }

    fn confirm(&mut self, request: &ConfirmationRequest) -> bool {
        self.confirm_requests.push(request.clone());
        self.confirmations.pop_front().unwrap_or(false)
    }

    fn on_turn_failed(&mut self, error: &AgentError) {
        self.failures.push(error.to_string());
    }
}
