//! uxagent - tool-calling LLM agent for UX reviews
//!
//! A CLI that sends a UX problem to an OpenAI-compatible chat model, lets
//! the model call local analysis tools, and prints its final proposal.
//!
//! Exit codes:
//!   0 - The model produced a final answer
//!   1 - Runtime error (connection, config, invalid input, etc.)
//!   2 - Iteration budget exhausted without a final answer

mod agent;
mod cli;
mod config;
mod error;
mod prompts;
mod tools;
mod transcript;

use agent::{AgentLoop, Conversation, Message, OpenAiTransport};
use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use transcript::{RunStatus, Transcript};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args)?;

    info!("uxagent v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_agent(args).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .uxagent.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml()?;
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

fn system_prompt(args: &Args) -> Result<String> {
    match args.system_prompt_file {
        Some(ref path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read system prompt: {}", path.display())),
        None => Ok(prompts::SYSTEM_PROMPT.to_string()),
    }
}

fn spinner(enabled: bool) -> Result<Option<ProgressBar>> {
    if !enabled {
        return Ok(None);
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")?);
    pb.set_message("Agent is working...");
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(Some(pb))
}

/// Run the agent once. Returns the exit code (0 or 2).
async fn run_agent(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    let registry = Arc::new(tools::ux_registry()?);
    let transport = OpenAiTransport::new(config.openai_config(args.api_key.clone()))?;
    let agent = AgentLoop::new(config.agent_config(), transport, registry);

    let mut conversation = Conversation::new(vec![
        Message::system(system_prompt(&args)?),
        Message::user(args.user_prompt()?),
    ])?;

    if !args.quiet {
        println!("🤖 Model: {} via {}", config.model.name, config.model.api_base);
        println!("   Max iterations: {}\n", config.agent.max_iterations);
    }

    // Log lines and the spinner would fight over the terminal.
    let progress = spinner(!args.quiet && !args.verbose)?;
    let result = agent.run(&mut conversation).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if let Some(ref path) = args.transcript {
        Transcript::new(&config.model.name, RunStatus::from_result(&result), &conversation)
            .write(path)?;
        info!("Transcript written to {}", path.display());
    }

    let outcome = result?;
    if !args.quiet {
        println!("FINAL OUTPUT:\n");
    }
    println!("{}", outcome.text());

    Ok(if outcome.is_exhausted() { 2 } else { 0 })
}
