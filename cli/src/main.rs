use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use stepwise_core::agent::{AgentLoop, ContextBuilder, Operator, Session, SessionEnd, ToolRegistry};
use stepwise_core::{config, providers, tools};

mod console;
mod onboard;

use console::TerminalOperator;

#[derive(Parser)]
#[command(name = "stepwise")]
#[command(about = "stepwise - a plan, act, observe assistant for your terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the config file (default: ~/.stepwise/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file interactively
    Init,

    /// Chat with the assistant
    Chat {
        /// Run a single query and exit
        #[arg(short, long)]
        message: Option<String>,

        /// Override the configured model
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let command = cli.command.unwrap_or(Commands::Chat {
        message: None,
        model: None,
    });

    match command {
        Commands::Init => {
            let existing = config::load_config_or_default(cli.config.as_deref())
                .context("Could not load configuration")?;
            let new_config = onboard::run_init(existing).map_err(|e| {
                eprintln!("❌ Setup failed: {}", e);
                e
            })?;
            let path = config::save_config(&new_config, cli.config.as_deref())?;
            onboard::print_saved(&path);
        }
        Commands::Chat { message, model } => {
            let mut config = config::load_config(cli.config.as_deref())
                .context("Could not load configuration")?;
            if let Some(model) = model {
                config.model = model;
            }
            config.validate()?;

            run_chat(config, message).await?;
        }
    }

    Ok(())
}

async fn run_chat(config: config::Config, message: Option<String>) -> Result<()> {
    let workspace = config.workspace();
    if !workspace.exists() {
        std::fs::create_dir_all(&workspace).with_context(|| {
            format!("Could not create workspace at {}", workspace.display())
        })?;
    }

    let provider = match providers::create_provider(&config) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            eprintln!("Export {} and try again.", config::API_KEY_ENV);
            return Err(e.into());
        }
    };

    let interrupt = tools::Interrupt::new();
    spawn_interrupt_handler(interrupt.clone());

    let tool_registry = Arc::new(ToolRegistry::with_builtin_tools(&config, interrupt));
    let system_prompt = ContextBuilder::new(&workspace)
        .with_tool_specs(tool_registry.get_specs())
        .build_system_prompt();

    let agent_loop = AgentLoop::new(provider, tool_registry)
        .with_max_steps(config.max_steps)
        .with_max_protocol_retries(config.max_protocol_retries)
        .with_confirmation(config.require_confirmation);

    let mut session = Session::new(agent_loop, system_prompt);
    tracing::debug!(session = %session.id(), model = %config.model, "starting chat");

    if let Some(msg) = message {
        let mut operator = TerminalOperator::new(None);
        if let Err(e) = session.ask(&msg, &mut operator).await {
            operator.on_turn_failed(&e);
            anyhow::bail!("Turn failed: {}", e);
        }
        return Ok(());
    }

    let mut operator = TerminalOperator::new(Some(config::get_history_path()));
    operator.print_banner();

    if session.run(&mut operator).await == SessionEnd::InputClosed {
        println!();
    }
    println!("👋 Goodbye!");

    if !session.file_log().is_empty() {
        println!("Files touched this session:");
        for entry in session.file_log() {
            println!("  - {}", entry);
        }
    }

    Ok(())
}

/// Ctrl+C while a tool runs kills its child process; the turn continues with the error.
/// With nothing to kill, the first Ctrl+C warns and a second one quits.
fn spawn_interrupt_handler(interrupt: tools::Interrupt) {
    tokio::spawn(async move {
        let mut armed = false;
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupt.trigger() {
                tracing::debug!("interrupted running tool");
                armed = false;
            } else if armed {
                eprintln!();
                std::process::exit(130);
            } else {
                eprintln!("\nNothing to interrupt. Press Ctrl+C again to quit.");
                armed = true;
            }
        }
    });
}
