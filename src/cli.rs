//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// uxagent - tool-calling LLM agent for UX reviews
///
/// Describe a UX problem and the agent analyses it with readability,
/// usability-heuristic and A/B-testing tools before proposing a fix.
///
/// Examples:
///   uxagent "Users abandon checkout at the delivery step"
///   uxagent --prompt-file problem.txt --model gpt-4o-mini
///   uxagent --api-base http://localhost:11434/v1 --model llama3.2 "..."
///   uxagent --transcript run.json "..."
///   uxagent --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Problem description sent as the user message
    #[arg(
        value_name = "PROMPT",
        required_unless_present_any = ["prompt_file", "init_config"],
        conflicts_with = "prompt_file"
    )]
    pub prompt: Option<String>,

    /// Read the user message from a file instead
    #[arg(long, value_name = "FILE")]
    pub prompt_file: Option<PathBuf>,

    /// Replace the built-in system prompt with the contents of a file
    #[arg(long, value_name = "FILE")]
    pub system_prompt_file: Option<PathBuf>,

    /// Chat model to use
    ///
    /// Can also be set via UXAGENT_MODEL env var or .uxagent.toml config.
    #[arg(short, long, env = "UXAGENT_MODEL")]
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, value_name = "URL", env = "UXAGENT_API_BASE")]
    pub api_base: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Maximum model/tool rounds before giving up
    #[arg(long, value_name = "COUNT")]
    pub max_iterations: Option<usize>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .uxagent.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the full conversation as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub transcript: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .uxagent.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if let Some(ref api_base) = self.api_base {
            if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
                return Err("API base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 2.0".to_string());
            }
        }

        if self.max_iterations == Some(0) {
            return Err("Max iterations must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref path) = self.prompt_file {
            if !path.is_file() {
                return Err(format!("Prompt file does not exist: {}", path.display()));
            }
        }

        if let Some(ref prompt) = self.prompt {
            if prompt.trim().is_empty() {
                return Err("Prompt must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// The user message, from the positional argument or `--prompt-file`.
    pub fn user_prompt(&self) -> Result<String> {
        match (&self.prompt, &self.prompt_file) {
            (Some(prompt), _) => Ok(prompt.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read prompt file: {}", path.display())),
            (None, None) => anyhow::bail!("No prompt given"),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
