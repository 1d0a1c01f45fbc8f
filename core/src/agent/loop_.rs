use crate::agent::conversation::{Conversation, Observation};
use crate::agent::operator::{Operator, TurnEvent};
use crate::agent::registry::ToolRegistry;
use crate::agent::step::{Step, StepBody, ToolInvocation};
use crate::error::{AgentError, ToolError};
use crate::traits::{ChatRequest, Provider, ToolOutcome};
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_MAX_STEPS: usize = 40;
const DEFAULT_MAX_PROTOCOL_RETRIES: usize = 3;

/// What a turn produced once the model sent its `output` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub content: String,
    /// File log entries reported during this turn, de-duplicated, in order.
    pub file_log: Vec<String>,
    pub model_calls: usize,
    pub tool_calls: usize,
}

pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    tool_registry: Arc<ToolRegistry>,
    max_steps: usize,
    max_protocol_retries: usize,
    require_confirmation: bool,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn Provider>, tool_registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            tool_registry,
            max_steps: DEFAULT_MAX_STEPS,
            max_protocol_retries: DEFAULT_MAX_PROTOCOL_RETRIES,
            require_confirmation: true,
        }
    }

    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max.max(1);
        self
    }

    pub fn with_max_protocol_retries(mut self, max: usize) -> Self {
        self.max_protocol_retries = max;
        self
    }

    pub fn with_confirmation(mut self, require: bool) -> Self {
        self.require_confirmation = require;
        self
    }

    /// Runs one user query to completion: model call, decode, dispatch, repeat until
    /// the model sends an `output` step.
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
        query: &str,
        operator: &mut dyn Operator,
    ) -> Result<TurnOutcome, AgentError> {
        conversation.push_user(query);

        let mut file_log: Vec<String> = Vec::new();
        let mut model_calls = 0;
        let mut tool_calls = 0;
        let mut failed_decodes = 0;

        loop {
            if model_calls >= self.max_steps {
                warn!("Turn hit the step limit of {}", self.max_steps);
                return Err(AgentError::StepLimit(self.max_steps));
            }
            model_calls += 1;

            let raw = self.request_step(conversation).await?;
            conversation.push_assistant(raw.as_str());

            let step = match Step::decode(&raw) {
                Ok(step) => {
                    failed_decodes = 0;
                    step
                }
                Err(error) => {
                    failed_decodes += 1;
                    warn!(attempt = failed_decodes, "Malformed step from model: {}", error);
                    if failed_decodes > self.max_protocol_retries {
                        return Err(AgentError::Protocol {
                            attempts: failed_decodes,
                            last: error,
                        });
                    }
                    operator.on_event(TurnEvent::ProtocolRetry {
                        error: &error,
                        attempt: failed_decodes,
                    });
                    conversation.push_correction(&error);
                    continue;
                }
            };

            debug!(step = ?step.kind(), "decoded step");
            merge_file_log(&mut file_log, step.file_log);

            match step.body {
                StepBody::Plan { content } => {
                    operator.on_event(TurnEvent::Plan(&content));
                }
                StepBody::Observe { content } => {
                    operator.on_event(TurnEvent::Observe(&content));
                }
                StepBody::Action(invocation) => {
                    tool_calls += 1;
                    operator.on_event(TurnEvent::ToolCall {
                        name: &invocation.name,
                        input: &invocation.input,
                    });

                    let outcome = self.dispatch(&invocation, operator).await;
                    operator.on_event(TurnEvent::ToolResult {
                        name: &invocation.name,
                        outcome: &outcome,
                    });

                    conversation.push_observation(&Observation::from_outcome(&outcome));
                }
                StepBody::Output { content } => {
                    operator.on_event(TurnEvent::Output {
                        content: &content,
                        file_log: &file_log,
                    });
                    return Ok(TurnOutcome {
                        content,
                        file_log,
                        model_calls,
                        tool_calls,
                    });
                }
            }
        }
    }

    async fn request_step(&self, conversation: &Conversation) -> Result<String, AgentError> {
        let request = ChatRequest {
            messages: conversation.messages(),
            json_mode: true,
        };

        let response = self
            .provider
            .chat(request)
            .await
            .map_err(AgentError::Model)?;

        Ok(response.text_or_empty().to_string())
    }

    /// Resolves and runs one tool call. Failures come back as `Err` values, never panics.
    async fn dispatch(
        &self,
        invocation: &ToolInvocation,
        operator: &mut dyn Operator,
    ) -> ToolOutcome {
        let Some(tool) = self.tool_registry.resolve(&invocation.name) else {
            warn!("Model asked for unknown tool: {}", invocation.name);
            return Err(ToolError::NotFound(invocation.name.clone()));
        };

        if self.require_confirmation
            && let Some(request) = tool.confirmation(&invocation.input).await
        {
            if !operator.confirm(&request) {
                debug!(tool = %invocation.name, "operator declined tool call");
                return Err(ToolError::Declined(request.summary));
            }
        }

        let outcome = tool.execute(invocation.input.clone()).await;
        if let Err(e) = &outcome {
            debug!(tool = %invocation.name, kind = e.kind(), "tool failed: {}", e);
        }
        outcome
    }
}

fn merge_file_log(log: &mut Vec<String>, entries: Vec<String>) {
    for entry in entries {
        let entry = entry.trim().to_string();
        if !entry.is_empty() && !log.contains(&entry) {
            log.push(entry);
        }
    }
}
