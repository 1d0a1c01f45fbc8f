use crate::error::{AgentError, ProtocolError};
use crate::traits::{ConfirmationRequest, ToolOutcome};
use serde_json::Value;

const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorInput {
    Query(String),
    Exit,
    /// The input stream is gone (EOF, terminal closed).
    Closed,
}

impl OperatorInput {
    /// Interprets one typed line. Blank lines yield `None` and are ignored by the session.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if EXIT_COMMANDS.iter().any(|c| c.eq_ignore_ascii_case(line)) {
            return Some(Self::Exit);
        }
        Some(Self::Query(line.to_string()))
    }
}

/// Everything the loop wants the operator to see while a turn runs.
#[derive(Debug, Clone, Copy)]
pub enum TurnEvent<'a> {
    Plan(&'a str),
    Observe(&'a str),
    ToolCall {
        name: &'a str,
        input: &'a Value,
    },
    ToolResult {
        name: &'a str,
        outcome: &'a ToolOutcome,
    },
    ProtocolRetry {
        error: &'a ProtocolError,
        attempt: usize,
    },
    Output {
        content: &'a str,
        file_log: &'a [String],
    },
}

/// The human side of a session: where queries come from and where steps are shown.
pub trait Operator {
    fn read_input(&mut self) -> OperatorInput;

    fn on_event(&mut self, event: TurnEvent<'_>);

    /// Blocks until the operator approves or refuses.
    fn confirm(&mut self, request: &ConfirmationRequest) -> bool;

    fn on_turn_failed(&mut self, error: &AgentError);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lines() {
        assert_eq!(OperatorInput::from_line("   "), None);
        assert_eq!(OperatorInput::from_line("quit"), Some(OperatorInput::Exit));
        assert_eq!(OperatorInput::from_line(" EXIT "), Some(OperatorInput::Exit));
        assert_eq!(OperatorInput::from_line("/quit"), Some(OperatorInput::Exit));
        assert_eq!(
            OperatorInput::from_line(" what is the weather in paris? "),
            Some(OperatorInput::Query("what is the weather in paris?".into()))
        );
        assert_eq!(
            OperatorInput::from_line("exit the vim tutorial"),
            Some(OperatorInput::Query("exit the vim tutorial".into()))
        );
    }
}
