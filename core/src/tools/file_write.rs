use crate::error::ToolError;
use crate::tools::{extract_string_arg, is_env_file, resolve_path};
use crate::traits::{ConfirmationRequest, Tool, ToolOutcome};
use async_trait::async_trait;
use serde_json::json;
use similar::TextDiff;

pub struct FileWriteTool {
    workspace: std::path::PathBuf,
}

impl FileWriteTool {
    pub fn new(workspace: impl AsRef<std::path::Path>) -> Self {
        Self {
            workspace: workspace.as_ref().to_path_buf(),
        }
    }
}

fn unified_diff(path: &str, old: &str, new: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Takes {path, content} and writes the content to the file, creating parent folders. Overwriting an existing file asks the user first"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file to write"
                },
                "content": {
                    "type": "string",
                    "description": "Full content of the file"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn confirmation(&self, input: &serde_json::Value) -> Option<ConfirmationRequest> {
        let path = extract_string_arg(input, "path").ok()?;
        let content = extract_string_arg(input, "content").ok()?;
        let full_path = resolve_path(&self.workspace, &path);

        // Never read a secrets file; execute reports it as forbidden.
        if is_env_file(&full_path) {
            return None;
        }

        let existing = tokio::fs::read_to_string(&full_path).await.ok()?;
        if existing == content {
            return None;
        }

        Some(
            ConfirmationRequest::new(format!("Overwrite existing file '{}'?", path))
                .with_detail(unified_diff(&path, &existing, &content)),
        )
    }

    async fn execute(&self, input: serde_json::Value) -> ToolOutcome {
        let path = extract_string_arg(&input, "path")?;
        let content = extract_string_arg(&input, "content")?;
        let full_path = resolve_path(&self.workspace, &path);

        if is_env_file(&full_path) {
            return Err(ToolError::Forbidden(path));
        }

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match tokio::fs::write(&full_path, content).await {
            Ok(_) => Ok(format!("Wrote file at {}", path)),
            Err(e) => Err(ToolError::Io(format!(
                "Failed to write file '{}': {}",
                path, e
            ))),
        }
    }
}
