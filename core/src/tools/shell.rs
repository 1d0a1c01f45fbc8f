use crate::error::ToolError;
use crate::tools::{Interrupt, string_input, truncate_output};
use crate::traits::{Tool, ToolOutcome};
use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.stdout.trim().is_empty() {
            out.push_str(self.stdout.trim_end());
        }
        if !self.stderr.trim().is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("[stderr]\n");
            out.push_str(self.stderr.trim_end());
        }
        truncate_output(&out)
    }
}

/// Runs `command` through `sh -c` in `dir`. The child is killed when the timeout
/// fires or the interrupt is triggered.
pub(crate) async fn run_shell(
    command: &str,
    dir: &Path,
    timeout: Duration,
    interrupt: &Interrupt,
) -> Result<CommandOutput, ToolError> {
    let child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ToolError::Io(format!("Failed to execute command: {}", e)))?;

    tracing::debug!(command, dir = %dir.display(), "spawned child process");

    tokio::select! {
        result = tokio::time::timeout(timeout, child.wait_with_output()) => match result {
            Ok(Ok(output)) => Ok(CommandOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }),
            Ok(Err(e)) => Err(ToolError::Io(format!("Failed to wait for command: {}", e))),
            Err(_) => {
                tracing::warn!(command, "command timed out after {}s", timeout.as_secs());
                Err(ToolError::Timeout(timeout.as_secs()))
            }
        },
        _ = interrupt.triggered() => {
            tracing::warn!(command, "command interrupted by operator");
            Err(ToolError::Interrupted)
        }
    }
}

pub struct ShellTool {
    workspace: PathBuf,
    timeout: Duration,
    interrupt: Interrupt,
}

impl ShellTool {
    pub fn new(workspace: impl AsRef<Path>) -> Self {
        Self {
            workspace: workspace.as_ref().to_path_buf(),
            timeout: Duration::from_secs(300),
            interrupt: Interrupt::default(),
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
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "run_command"
    }

    fn description(&self) -> &str {
        "Takes a linux shell command as a string, executes it in the workspace and returns its exit status, stdout and stderr"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "string",
            "description": "Shell command to execute, e.g. \"ls -la\""
        })
    }

    async fn execute(&self, input: serde_json::Value) -> ToolOutcome {
        let command = string_input(&input, "command")?;
        if command.trim().is_empty() {
            return Err(ToolError::InvalidInput("Command must not be empty".into()));
        }

        let output = run_shell(&command, &self.workspace, self.timeout, &self.interrupt).await?;

        if output.success() {
            let rendered = output.render();
            if rendered.is_empty() {
                Ok("Command succeeded with exit status 0 and no output.".to_string())
            } else {
                Ok(format!("Exit status 0\n{}", rendered))
            }
        } else {
            Err(ToolError::CommandFailed {
                code: output.code,
                output: output.render(),
            })
        }
    }
}
