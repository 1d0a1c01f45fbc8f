use crate::error::ToolError;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

pub mod deploy;
pub mod file_read;
pub mod file_write;
pub mod folder;
pub mod shell;
pub mod weather;

pub use deploy::DeployTool;
pub use file_read::FileReadTool;
pub use file_write::FileWriteTool;
pub use folder::CreateFolderTool;
pub use shell::ShellTool;
pub use weather::WeatherTool;

const MAX_OUTPUT_CHARS: usize = 16_000;

/// Lets the operator cancel whatever child process a tool is currently waiting on.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    notify: Arc<Notify>,
    waiting: Arc<AtomicUsize>,
}

/// Keeps the waiter count right when a `triggered()` future is dropped early.
struct WaitGuard<'a>(&'a AtomicUsize);

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wakes every tool currently waiting. Returns `false` when nothing was waiting.
    pub fn trigger(&self) -> bool {
        if self.waiting.load(Ordering::SeqCst) == 0 {
            return false;
        }
        self.notify.notify_waiters();
        true
    }

    pub async fn triggered(&self) {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let _guard = WaitGuard(&self.waiting);
        self.notify.notified().await;
    }
}

/// Accepts either a bare JSON string or an object carrying the string under `key`.
pub fn string_input(input: &Value, key: &str) -> Result<String, ToolError> {
    match input {
        Value::String(s) => Ok(s.clone()),
        Value::Object(map) => map
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ToolError::InvalidInput(format!("Missing '{}' parameter", key))),
        other => Err(ToolError::InvalidInput(format!(
            "Expected a string or an object with '{}', got {}",
            key, other
        ))),
    }
}

pub fn extract_string_arg(input: &Value, key: &str) -> Result<String, ToolError> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ToolError::InvalidInput(format!("Missing '{}' parameter", key)))
}

pub fn extract_string_arg_opt(input: &Value, key: &str, default: &str) -> String {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or(default)
        .to_string()
}

pub(crate) fn resolve_path(workspace: &Path, path: &str) -> PathBuf {
    workspace.join(path)
}

/// `.env` and `.env.*` files hold secrets and are off limits to every file tool.
pub(crate) fn is_env_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name == ".env" || name.starts_with(".env."))
}

pub(crate) fn truncate_output(text: &str) -> String {
    if text.chars().count() <= MAX_OUTPUT_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(MAX_OUTPUT_CHARS).collect();
    format!("{}\n[... output truncated at {} chars]", truncated, MAX_OUTPUT_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_input_accepts_both_shapes() {
        assert_eq!(string_input(&json!("ls"), "command").unwrap(), "ls");
        assert_eq!(
            string_input(&json!({"command": "pwd"}), "command").unwrap(),
            "pwd"
        );
        assert!(matches!(
            string_input(&json!({"cmd": "pwd"}), "command"),
            Err(ToolError::InvalidInput(_))
        ));
        assert!(matches!(
            string_input(&json!(42), "command"),
            Err(ToolError::InvalidInput(_))
        ));
    }

    #[test]
    fn env_files_detected() {
        assert!(is_env_file(Path::new(".env")));
        assert!(is_env_file(Path::new("app/.env.local")));
        assert!(!is_env_file(Path::new("app/.envrc")));
        assert!(!is_env_file(Path::new("env.txt")));
    }

    #[test]
    fn long_output_truncated() {
        let long = "x".repeat(MAX_OUTPUT_CHARS + 10);
        let out = truncate_output(&long);
        assert!(out.ends_with(&format!("[... output truncated at {} chars]", MAX_OUTPUT_CHARS)));
        assert_eq!(truncate_output("short"), "short");
    }

    #[tokio::test]
    async fn interrupt_wakes_waiter() {
        let interrupt = Interrupt::new();
        let waiter = {
            let interrupt = interrupt.clone();
            tokio::spawn(async move { interrupt.triggered().await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(interrupt.trigger());
        tokio::time::timeout(std::time::Duration::from_secs(2), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn trigger_with_nothing_running_reports_idle() {
        let interrupt = Interrupt::new();
        assert!(!interrupt.trigger());

        // A waiter that gave up no longer counts.
        let gave_up = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            interrupt.triggered(),
        )
        .await;
        assert!(gave_up.is_err());
        assert!(!interrupt.trigger());
    }
}
