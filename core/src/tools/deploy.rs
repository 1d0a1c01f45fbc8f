use crate::error::ToolError;
use crate::tools::shell::run_shell;
use crate::tools::{Interrupt, extract_string_arg, extract_string_arg_opt, resolve_path};
use crate::traits::{ConfirmationRequest, Tool, ToolOutcome};
use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SUPPORTED_PLATFORM: &str = "vercel";

struct DeployRequest {
    project_dir: String,
    flags: String,
}

fn parse_request(input: &serde_json::Value) -> Result<DeployRequest, ToolError> {
    let platform = extract_string_arg(input, "platform")?;
    if platform != SUPPORTED_PLATFORM {
        return Err(ToolError::UnsupportedPlatform(platform));
    }

    let project_dir = extract_string_arg(input, "project_dir")?;
    let flags = extract_string_arg_opt(input, "flags", "");

    Ok(DeployRequest { project_dir, flags })
}

fn targets_production(flags: &str) -> bool {
    flags.split_whitespace().any(|f| f == "--prod" || f == "--prod=true")
}

pub struct DeployTool {
    workspace: PathBuf,
    timeout: Duration,
    interrupt: Interrupt,
    cli: String,
}

impl DeployTool {
    pub fn new(workspace: impl AsRef<Path>) -> Self {
        Self {
            workspace: workspace.as_ref().to_path_buf(),
            timeout: Duration::from_secs(900),
            interrupt: Interrupt::default(),
            cli: SUPPORTED_PLATFORM.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Overrides the deploy executable, mainly so tests do not need the real CLI.
    pub fn with_cli(mut self, cli: impl Into<String>) -> Self {
        self.cli = cli.into();
        self
    }
}

#[async_trait]
impl Tool for DeployTool {
    fn name(&self) -> &str {
        "deploy_app"
    }

    fn description(&self) -> &str {
        "Deploys a project. Takes {platform, project_dir, flags?}; only the \"vercel\" platform is supported. Production deploys ask the user first"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "platform": {
                    "type": "string",
                    "enum": [SUPPORTED_PLATFORM]
                },
                "project_dir": {
                    "type": "string",
                    "description": "Directory of the project to deploy"
                },
                "flags": {
                    "type": "string",
                    "description": "Extra CLI flags, e.g. \"--prod\""
                }
            },
            "required": ["platform", "project_dir"]
        })
    }

    async fn confirmation(&self, input: &serde_json::Value) -> Option<ConfirmationRequest> {
        let request = parse_request(input).ok()?;
        if !targets_production(&request.flags) {
            return None;
        }

        Some(
            ConfirmationRequest::new(format!(
                "Deploy '{}' to production?",
                request.project_dir
            ))
            .with_detail(format!("{} {}", self.cli, request.flags.trim())),
        )
    }

    async fn execute(&self, input: serde_json::Value) -> ToolOutcome {
        let request = parse_request(&input)?;
        let dir = resolve_path(&self.workspace, &request.project_dir);

        if !dir.is_dir() {
            return Err(ToolError::InvalidInput(format!(
                "Project directory '{}' does not exist",
                request.project_dir
            )));
        }

        let command = format!("{} {}", self.cli, request.flags).trim().to_string();
        tracing::info!(command = %command, dir = %dir.display(), "running deployment");

        let output = run_shell(&command, &dir, self.timeout, &self.interrupt).await?;

        if output.success() {
            Ok(format!(
                "Deployment command executed successfully.\n{}",
                output.render()
            )
            .trim_end()
            .to_string())
        } else {
            Err(ToolError::CommandFailed {
                code: output.code,
                output: output.render(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn rejects_other_platforms() {
        let tmp = TempDir::new().unwrap();
        let tool = DeployTool::new(tmp.path());

        let err = tool
            .execute(json!({"platform": "netlify", "project_dir": "."}))
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::UnsupportedPlatform("netlify".into()));
    }

    #[tokio::test]
    async fn missing_project_dir() {
        let tmp = TempDir::new().unwrap();
        let tool = DeployTool::new(tmp.path());

        assert!(matches!(
            tool.execute(json!({"platform": "vercel"})).await,
            Err(ToolError::InvalidInput(_))
        ));
        assert!(matches!(
            tool.execute(json!({"platform": "vercel", "project_dir": "nope"}))
                .await,
            Err(ToolError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn runs_cli_in_project_dir_with_flags() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("app")).unwrap();
        let tool = DeployTool::new(tmp.path()).with_cli("echo deployed; pwd; echo");

        let out = tool
            .execute(json!({"platform": "vercel", "project_dir": "app", "flags": "--yes"}))
            .await
            .unwrap();
        assert!(out.starts_with("Deployment command executed successfully."));
        assert!(out.contains("deployed"));
        assert!(out.contains("app"));
        assert!(out.contains("--yes"));
    }

    #[tokio::test]
    async fn failing_cli_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let tool = DeployTool::new(tmp.path()).with_cli("false");

        let err = tool
            .execute(json!({"platform": "vercel", "project_dir": "."}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::CommandFailed { code: Some(1), .. }));
    }

    #[tokio::test]
    async fn production_deploy_needs_confirmation() {
        let tmp = TempDir::new().unwrap();
        let tool = DeployTool::new(tmp.path());

        let preview = json!({"platform": "vercel", "project_dir": "app"});
        assert!(tool.confirmation(&preview).await.is_none());

        let prod = json!({"platform": "vercel", "project_dir": "app", "flags": "--prod --yes"});
        let request = tool.confirmation(&prod).await.unwrap();
        assert_eq!(request.summary, "Deploy 'app' to production?");
        assert_eq!(request.detail.as_deref(), Some("vercel --prod --yes"));
    }
}
