pub mod provider;
pub mod tool;

pub use provider::{ChatMessage, ChatRequest, ChatResponse, Provider, Role};
pub use tool::{ConfirmationRequest, Tool, ToolOutcome, ToolSpec};
