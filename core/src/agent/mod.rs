pub mod context;
pub mod conversation;
pub mod loop_;
pub mod operator;
pub mod registry;
pub mod session;
pub mod step;

#[cfg(test)]
pub(crate) mod testing;

pub use context::ContextBuilder;
pub use conversation::{Conversation, Observation};
pub use loop_::{AgentLoop, TurnOutcome};
pub use operator::{Operator, OperatorInput, TurnEvent};
pub use registry::ToolRegistry;
pub use session::{Session, SessionEnd};
pub use step::{Step, StepBody, StepKind, ToolInvocation};
