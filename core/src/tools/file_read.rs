use crate::error::ToolError;
use crate::tools::{is_env_file, resolve_path, string_input};
use crate::traits::{Tool, ToolOutcome};
use async_trait::async_trait;
use serde_json::json;

pub struct FileReadTool {
    workspace: std::path::PathBuf,
}

impl FileReadTool {
    pub fn new(workspace: impl AsRef<std::path::Path>) -> Self {
        Self {
            workspace: workspace.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Takes a file path as input and returns the contents of the file"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "string",
            "description": "Path to the file to read, relative to the workspace or absolute"
        })
    }

    async fn execute(&self, input: serde_json::Value) -> ToolOutcome {
        let path = string_input(&input, "path")?;
        let full_path = resolve_path(&self.workspace, &path);

        if is_env_file(&full_path) {
            return Err(ToolError::Forbidden(path));
        }

        match tokio::fs::read_to_string(&full_path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ToolError::FileNotFound(path))
            }
            Err(e) => Err(ToolError::Io(format!("Failed to read file '{}': {}", path, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reads_relative_to_workspace() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("hello.txt"), "hi there").unwrap();
        let tool = FileReadTool::new(tmp.path());

        assert_eq!(tool.execute(json!("hello.txt")).await.unwrap(), "hi there");
        assert_eq!(
            tool.execute(json!({"path": "hello.txt"})).await.unwrap(),
            "hi there"
        );
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let tool = FileReadTool::new(tmp.path());

        let err = tool.execute(json!("missing.txt")).await.unwrap_err();
        assert_eq!(err, ToolError::FileNotFound("missing.txt".into()));
        assert_eq!(err.to_string(), "File 'missing.txt' not found.");
    }

    #[tokio::test]
    async fn directory_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("dir")).unwrap();
        let tool = FileReadTool::new(tmp.path());

        assert!(matches!(
            tool.execute(json!("dir")).await,
            Err(ToolError::Io(_))
        ));
    }

    #[tokio::test]
    async fn env_file_forbidden() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(".env"), "SECRET=1").unwrap();
        let tool = FileReadTool::new(tmp.path());

        assert_eq!(
            tool.execute(json!(".env")).await.unwrap_err(),
            ToolError::Forbidden(".env".into())
        );
    }
}
