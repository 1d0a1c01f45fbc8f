use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;
use stepwise_core::config::{API_KEY_ENV, Config};

const MODELS: &[&str] = &["gpt-4.1", "gpt-4.1-mini", "gpt-4o", "gpt-4o-mini"];

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn setup_model(current: &str) -> Result<String> {
    let default = MODELS.iter().position(|m| *m == current).unwrap_or(0);

    let selection = Select::new()
        .with_prompt("Select your model")
        .items(MODELS)
        .default(default)
        .interact()
        .context("Failed to select model")?;

    Ok(MODELS[selection].to_string())
}

fn setup_workspace(current: Option<&PathBuf>) -> Result<Option<PathBuf>> {
    let initial = current
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    let workspace: String = Input::new()
        .with_prompt("Workspace directory (empty = current directory)")
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()
        .context("Failed to read workspace directory")?;

    let workspace = workspace.trim();
    if workspace.is_empty() {
        return Ok(None);
    }

    let path = PathBuf::from(workspace);
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Could not create workspace at {}", path.display()))?;
    Ok(Some(path))
}

fn setup_confirmation(current: bool) -> Result<bool> {
    Confirm::new()
        .with_prompt("Ask before overwriting files and deploying to production?")
        .default(current)
        .interact()
        .context("Failed to read confirmation policy")
}

/// Walks the operator through the config fields and returns the result. Saving is left to the caller.
pub fn run_init(existing: Config) -> Result<Config> {
    println!("  {}", style("Welcome to stepwise!").white().bold());
    println!(
        "  {}",
        style("This wizard writes your config file. The API key stays in the environment.").dim()
    );

    print_step(1, 3, "Model Selection");
    let model = setup_model(&existing.model)?;

    print_step(2, 3, "Workspace Setup");
    let workspace_dir = setup_workspace(existing.workspace_dir.as_ref())?;

    print_step(3, 3, "Confirmations");
    let require_confirmation = setup_confirmation(existing.require_confirmation)?;

    if std::env::var(API_KEY_ENV).map_or(true, |k| k.trim().is_empty()) {
        println!();
        println!(
            "  {} {} is not set. Export it before running {}.",
            style("!").yellow(),
            API_KEY_ENV,
            style("stepwise chat").cyan()
        );
    }

    Ok(Config {
        model,
        workspace_dir,
        require_confirmation,
        ..existing
    })
}

pub fn print_saved(path: &std::path::Path) {
    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config saved to {}",
        style("→").green(),
        style(path.display()).cyan()
    );
    println!(
        "  {} You can now run: {}",
        style("→").green(),
        style("stepwise chat").cyan().bold()
    );
    println!();
}
