use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What every tool returns. The loop branches on the variant, never on the text.
pub type ToolOutcome = Result<String, ToolError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters_schema: serde_json::Value,
}

/// A question the operator has to answer before a tool is allowed to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub summary: String,
    /// Extra context shown under the summary, e.g. a unified diff.
    pub detail: Option<String>,
}

impl ConfirmationRequest {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(&self, input: serde_json::Value) -> ToolOutcome;

    /// Returns a request when running with `input` needs the operator's approval first.
    async fn confirmation(&self, _input: &serde_json::Value) -> Option<ConfirmationRequest> {
        None
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters_schema: self.parameters_schema(),
        }
    }
}
