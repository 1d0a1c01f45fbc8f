use crate::tools::{resolve_path, string_input};
use crate::traits::{Tool, ToolOutcome};
use async_trait::async_trait;
use serde_json::json;

pub struct CreateFolderTool {
    workspace: std::path::PathBuf,
}

impl CreateFolderTool {
    pub fn new(workspace: impl AsRef<std::path::Path>) -> Self {
        Self {
            workspace: workspace.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Tool for CreateFolderTool {
    fn name(&self) -> &str {
        "create_folder"
    }

    fn description(&self) -> &str {
        "Takes a folder path as input and creates it, including missing parents. Succeeds if it already exists"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "string",
            "description": "Folder path to create"
        })
    }

    async fn execute(&self, input: serde_json::Value) -> ToolOutcome {
        let path = string_input(&input, "path")?;
        let full_path = resolve_path(&self.workspace, &path);

        tokio::fs::create_dir_all(&full_path).await?;
        Ok(format!("Folder '{}' created successfully.", path))
    }
}
