use console::style;
use dialoguer::Confirm;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde_json::Value;
use std::path::PathBuf;
use stepwise_core::agent::{Operator, OperatorInput, TurnEvent};
use stepwise_core::error::AgentError;
use stepwise_core::traits::ConfirmationRequest;
use termimad::MadSkin;

const PROMPT: &str = "> ";
const PREVIEW_LINES: usize = 8;

/// The operator at an interactive terminal.
pub struct TerminalOperator {
    editor: Option<DefaultEditor>,
    history_path: Option<PathBuf>,
    skin: MadSkin,
}

impl TerminalOperator {
    pub fn new(history_path: Option<PathBuf>) -> Self {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => Some(editor),
            Err(e) => {
                tracing::warn!("Line editor unavailable, input disabled: {}", e);
                None
            }
        };

        if let (Some(editor), Some(path)) = (editor.as_mut(), history_path.as_ref())
            && path.exists()
            && let Err(e) = editor.load_history(path)
        {
            tracing::debug!("Could not load history from {}: {}", path.display(), e);
        }

        Self {
            editor,
            history_path,
            skin: MadSkin::default(),
        }
    }

    pub fn print_banner(&self) {
        println!("{}", style("stepwise").cyan().bold());
        println!(
            "{}",
            style("Ask anything. Type 'exit' or press Ctrl+D to quit.\n").dim()
        );
    }

    fn save_history(&mut self) {
        if let (Some(editor), Some(path)) = (self.editor.as_mut(), self.history_path.as_ref()) {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(e) = editor.save_history(path) {
                tracing::debug!("Could not save history to {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for TerminalOperator {
    fn drop(&mut self) {
        self.save_history();
    }
}

impl Operator for TerminalOperator {
    fn read_input(&mut self) -> OperatorInput {
        let Some(editor) = self.editor.as_mut() else {
            return OperatorInput::Closed;
        };

        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    if let Some(input) = OperatorInput::from_line(&line) {
                        let _ = editor.add_history_entry(line.trim());
                        return input;
                    }
                }
                // Ctrl+C at the prompt clears the line.
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return OperatorInput::Closed,
                Err(e) => {
                    tracing::warn!("Failed to read input: {}", e);
                    return OperatorInput::Closed;
                }
            }
        }
    }

    fn on_event(&mut self, event: TurnEvent<'_>) {
        match event {
            TurnEvent::Plan(content) => {
                println!("🧠: {}", style(content).dim());
            }
            TurnEvent::Observe(content) => {
                println!("👀: {}", style(content).dim());
            }
            TurnEvent::ToolCall { name, input } => {
                println!(
                    "🔧: Calling tool {} with input {}",
                    style(name).yellow().bold(),
                    format_input(input)
                );
            }
            TurnEvent::ToolResult { outcome, .. } => match outcome {
                Ok(output) => println!("{}", style(preview(output)).dim()),
                Err(e) => println!("{} {}", style("✗").red(), style(e).red()),
            },
            TurnEvent::ProtocolRetry { error, attempt } => {
                println!(
                    "{} malformed step ({}), asking the model again (attempt {})",
                    style("!").yellow(),
                    error,
                    attempt
                );
            }
            TurnEvent::Output { content, file_log } => {
                println!();
                print!("🤖: ");
                self.skin.print_text(content);
                if !file_log.is_empty() {
                    println!("{}", style("Files:").bold());
                    for entry in file_log {
                        println!("  {} {}", style("•").green(), entry);
                    }
                }
                println!();
            }
        }
    }

    fn confirm(&mut self, request: &ConfirmationRequest) -> bool {
        if let Some(detail) = &request.detail {
            println!();
            for line in detail.lines() {
                let styled = if line.starts_with('+') && !line.starts_with("+++") {
                    style(line).green()
                } else if line.starts_with('-') && !line.starts_with("---") {
                    style(line).red()
                } else {
                    style(line).dim()
                };
                println!("{}", styled);
            }
        }

        Confirm::new()
            .with_prompt(request.summary.as_str())
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    fn on_turn_failed(&mut self, error: &AgentError) {
        eprintln!("{} {}", style("❌ Error:").red().bold(), error);
    }
}

fn format_input(input: &Value) -> String {
    match input {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn preview(output: &str) -> String {
    let mut lines: Vec<&str> = output.lines().take(PREVIEW_LINES).collect();
    let total = output.lines().count();
    if total > PREVIEW_LINES {
        lines.push("...");
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_string_input_is_unquoted() {
        assert_eq!(format_input(&json!("new york")), "new york");
        assert_eq!(
            format_input(&json!({"path": "a.txt"})),
            r#"{"path":"a.txt"}"#
        );
    }

    #[test]
    fn long_output_is_cut() {
        let output = (0..20).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let shown = preview(&output);
        assert_eq!(shown.lines().count(), PREVIEW_LINES + 1);
        assert!(shown.ends_with("..."));
        assert_eq!(preview("one\ntwo"), "one\ntwo");
    }
}
