use crate::agent::conversation::Conversation;
use crate::agent::loop_::{AgentLoop, TurnOutcome};
use crate::agent::operator::{Operator, OperatorInput};
use crate::error::AgentError;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Why an interactive session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Exit,
    InputClosed,
}

/// One conversation with the operator, from the first query until exit.
pub struct Session {
    id: Uuid,
    agent: AgentLoop,
    conversation: Conversation,
    file_log: Vec<String>,
    turns: usize,
}

impl Session {
    pub fn new(agent: AgentLoop, system_prompt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent,
            conversation: Conversation::new(system_prompt),
            file_log: Vec::new(),
            turns: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Every file reported as created or modified since the session started.
    pub fn file_log(&self) -> &[String] {
        &self.file_log
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Reads queries until the operator exits or input closes. A failed turn is
    /// reported to the operator and the session keeps going.
    pub async fn run(&mut self, operator: &mut dyn Operator) -> SessionEnd {
        let span = info_span!("session", id = %self.id);

        async {
            info!("session started");
            let end = loop {
                let query = match operator.read_input() {
                    OperatorInput::Query(query) => query,
                    OperatorInput::Exit => break SessionEnd::Exit,
                    OperatorInput::Closed => break SessionEnd::InputClosed,
                };

                if let Err(e) = self.ask(&query, operator).await {
                    operator.on_turn_failed(&e);
                }
            };
            info!(turns = self.turns, end = ?end, "session ended");
            end
        }
        .instrument(span)
        .await
    }

    /// Runs a single turn for `query` against the shared history.
    pub async fn ask(
        &mut self,
        query: &str,
        operator: &mut dyn Operator,
    ) -> Result<TurnOutcome, AgentError> {
        self.turns += 1;
        let result = self
            .agent
            .run_turn(&mut self.conversation, query, operator)
            .await;

        match &result {
            Ok(outcome) => {
                for entry in &outcome.file_log {
                    if !self.file_log.contains(entry) {
                        self.file_log.push(entry.clone());
                    }
                }
            }
            Err(e) => warn!(turn = self.turns, "turn failed: {}", e),
        }
        result
    }
}
