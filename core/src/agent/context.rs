use crate::traits::ToolSpec;
use std::fmt::Write;
use std::path::{Path, PathBuf};

const NOTES_MAX_CHARS: usize = 20_000;
const NOTES_FILE: &str = "STEPWISE.md";

const IDENTITY: &str = "You are a helpful assistant that resolves the user's query one step at a time. \
You work in a plan, action, observe, output cycle and never skip ahead.";

const PROTOCOL: &str = r#"## Step Protocol

Every response is exactly one JSON object with a `step` field:

- `plan`: your reasoning about what to do next. `{"step": "plan", "content": "..."}`
- `action`: call one tool. `{"step": "action", "function": "<tool name>", "input": <tool input>}`
- `output`: the final answer for the user. `{"step": "output", "content": "..."}`

After an `action`, stop and wait. The tool result arrives as a message of the form
`{"step": "observe", "output": "..."}`. Results starting with `ERROR:` mean the call failed;
read the message and decide what to do next.

A turn ends only with an `output` step. Emit as many `plan` and `action` steps as you need before it.

### Example

User: What is the weather of new york?
{"step": "plan", "content": "The user wants the current weather in new york"}
{"step": "plan", "content": "get_weather can answer this"}
{"step": "action", "function": "get_weather", "input": "new york"}
(observation) {"step": "observe", "output": "The weather in new york is Clear +12°C"}
{"step": "output", "content": "It is clear in new york, about 12 degrees."}"#;

const RULES: &str = r#"## Rules

- One action per step. Never batch independent actions.
- Never read or modify `.env` files. Use placeholders for secrets.
- Overwriting an existing file and production deployments are confirmed by the operator
  before they run. If the operator declines, the result says so; do not retry the same call.
- When you create or modify files, list them in a `file_log` array on the step:
  `"file_log": ["<path> (created)", "<path> (modified)"]`.
- Prefer paths relative to the workspace.
- When asked to scaffold a web app without further detail, default to Next.js and explain how to
  run it (`npm install`, `npm run dev`, `npm run build`).
- Before deploying with `deploy_app`, present the plan and make sure build scripts exist."#;

/// Assembles the system prompt sent as the first message of every session.
pub struct ContextBuilder {
    pub workspace: PathBuf,
    pub tool_specs: Vec<ToolSpec>,
}

impl ContextBuilder {
    pub fn new(workspace: impl AsRef<Path>) -> Self {
        Self {
            workspace: workspace.as_ref().to_path_buf(),
            tool_specs: vec![],
        }
    }

    pub fn with_tool_specs(mut self, tool_specs: Vec<ToolSpec>) -> Self {
        self.tool_specs = tool_specs;
        self
    }

    pub fn build_system_prompt(&self) -> String {
        let mut parts = vec![IDENTITY.to_string(), PROTOCOL.to_string()];

        if let Some(tools) = self.get_tool_listing() {
            parts.push(tools);
        }
        parts.push(RULES.to_string());
        parts.push(self.get_runtime_context());

        if let Some(notes) = self.load_project_notes() {
            parts.push(notes);
        }

        parts.join("\n\n---\n\n")
    }

    fn get_tool_listing(&self) -> Option<String> {
        if self.tool_specs.is_empty() {
            return None;
        }

        let mut listing = String::from("## Available Tools\n\n");
        for tool in &self.tool_specs {
            let _ = writeln!(
                listing,
                "**{}**: {}\nInput: `{}`\n",
                tool.name, tool.description, tool.parameters_schema
            );
        }
        Some(listing.trim_end().to_string())
    }

    fn get_runtime_context(&self) -> String {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M (%A)");

        format!(
            "## Runtime Context

### Current Time
{}

### Workspace
{}",
            timestamp,
            self.workspace.display()
        )
    }

    fn load_project_notes(&self) -> Option<String> {
        let content = std::fs::read_to_string(self.workspace.join(NOTES_FILE)).ok()?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return None;
        }

        let body = if trimmed.chars().count() > NOTES_MAX_CHARS {
            let truncated: String = trimmed.chars().take(NOTES_MAX_CHARS).collect();
            format!(
                "{}\n\n[... truncated at {} chars, use read_file for the rest]\n",
                truncated, NOTES_MAX_CHARS
            )
        } else {
            trimmed.to_string()
        };

        Some(format!("## Project Notes ({})\n\n{}", NOTES_FILE, body))
    }
}
