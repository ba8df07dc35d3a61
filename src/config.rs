//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.uxagent.toml` files.

use crate::agent::{AgentConfig, OpenAiConfig};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".uxagent.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Agent loop settings.
    #[serde(default)]
    pub agent: AgentSettings,
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// OpenAI-compatible API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Temperature for generation. Provider default when unset.
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_base: default_api_base(),
            temperature: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    120
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Maximum model/tool rounds per run.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_max_iterations() -> usize {
    8
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from `dir/.uxagent.toml`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);

        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Try to load configuration from the default location.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line (or via env) override
    /// the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref api_base) = args.api_base {
            self.model.api_base = api_base.clone();
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = Some(temperature);
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(max_iterations) = args.max_iterations {
            self.agent.max_iterations = max_iterations;
        }
    }

    /// Check merged settings against the bounds `Args::validate` applies to flags.
    pub fn validate(&self) -> Result<()> {
        if self.agent.max_iterations == 0 {
            bail!("agent.max_iterations must be at least 1");
        }
        if self.model.timeout_seconds == 0 {
            bail!("model.timeout_seconds must be at least 1");
        }
        if !self.model.api_base.starts_with("http://") && !self.model.api_base.starts_with("https://") {
            bail!("model.api_base must start with http:// or https://");
        }
        if let Some(temperature) = self.model.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                bail!("model.temperature must be between 0.0 and 2.0");
            }
        }
        Ok(())
    }

    /// Transport settings. The API key never lives in the config file.
    pub fn openai_config(&self, api_key: Option<String>) -> OpenAiConfig {
        OpenAiConfig {
            api_base: self.model.api_base.clone(),
            api_key,
            model: self.model.name.clone(),
            temperature: self.model.temperature,
            timeout_seconds: self.model.timeout_seconds,
        }
    }

    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            max_iterations: self.agent.max_iterations,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&Config::default()).context("Failed to render default config")
    }
}
