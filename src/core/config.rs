//! Configuration management for MultiToolMind
//!
//! Supports environment variables, config files, and runtime overrides.
//! API keys are read from the environment only and never written to disk.
//!
//! Config file location: ~/.config/multitoolmind/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{MindError, Result};
use crate::tools::BuiltinTool;

/// Main configuration for MultiToolMind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model service configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// Tool backends configuration
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Agent loop configuration
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Model service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier sent with every request
    /// Default: qwen/qwen3-32b
    pub name: String,
    /// OpenAI-compatible API root
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature, provider default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Tools bound to the model, in this order
    pub enabled: Vec<BuiltinTool>,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
    #[serde(default)]
    pub arxiv: ArxivConfig,
    #[serde(default)]
    pub wikipedia: WikipediaConfig,
    #[serde(default)]
    pub tavily: TavilyConfig,
}

/// arXiv lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArxivConfig {
    pub base_url: String,
    /// Number of papers returned per query
    pub top_k_results: usize,
    /// Upper bound on the characters handed back to the model
    pub doc_content_chars_max: usize,
}

/// Wikipedia lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikipediaConfig {
    pub base_url: String,
    /// Number of pages summarized per query
    pub top_k_results: usize,
    /// Upper bound on the characters handed back to the model
    pub doc_content_chars_max: usize,
}

/// Tavily web search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TavilyConfig {
    pub base_url: String,
    pub max_results: usize,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum model invocations per user message
    /// Default: 10
    pub max_turns: usize,
    /// Run the tool calls of one turn concurrently
    pub parallel_tool_calls: bool,
    /// Whether to show debug output
    pub debug: bool,
    /// System prompt prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

const ENV_MODEL: &str = "MULTITOOLMIND_MODEL";
const ENV_BASE_URL: &str = "GROQ_BASE_URL";
const ENV_DEBUG: &str = "MULTITOOLMIND_DEBUG";

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "qwen/qwen3-32b".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            timeout_secs: 120,
            temperature: None,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: BuiltinTool::ALL.to_vec(),
            timeout_secs: 30,
            arxiv: ArxivConfig::default(),
            wikipedia: WikipediaConfig::default(),
            tavily: TavilyConfig::default(),
        }
    }
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            base_url: "https://export.arxiv.org/api".to_string(),
            top_k_results: 2,
            doc_content_chars_max: 500,
        }
    }
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org/w/api.php".to_string(),
            top_k_results: 1,
            doc_content_chars_max: 500,
        }
    }
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tavily.com".to_string(),
            max_results: 5,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: 10,
            parallel_tool_calls: false,
            debug: false,
            system_prompt: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("multitoolmind")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let mut config = if Self::config_file().exists() {
            Self::load_from_file()?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override file values with `MULTITOOLMIND_MODEL`, `GROQ_BASE_URL`
    /// and `MULTITOOLMIND_DEBUG` when they are set
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    /// Same as [`Config::apply_env_overrides`], reading variables through `lookup`
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(model) = var(ENV_MODEL) {
            self.model.name = model;
        }
        if let Some(base_url) = var(ENV_BASE_URL) {
            self.model.base_url = base_url;
        }
        if let Some(debug) = var(ENV_DEBUG) {
            self.agent.debug =
                matches!(debug.to_lowercase().as_str(), "true" | "1" | "yes" | "on");
        }
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        let content = fs::read_to_string(&config_path)
            .map_err(|e| MindError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text; missing sections take defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MindError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| MindError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| MindError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| MindError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Reject settings the agent cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.agent.max_turns == 0 {
            return Err(MindError::config("agent.max_turns must be at least 1"));
        }

        if self.model.name.trim().is_empty() {
            return Err(MindError::config("model.name must not be empty"));
        }

        for (i, tool) in self.tools.enabled.iter().enumerate() {
            if self.tools.enabled[..i].contains(tool) {
                return Err(MindError::config(format!(
                    "tool '{}' is enabled more than once",
                    tool
                )));
            }
        }

        if self.tools.arxiv.top_k_results == 0 || self.tools.wikipedia.top_k_results == 0 {
            return Err(MindError::config("tools.*.top_k_results must be at least 1"));
        }

        Ok(())
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}

/// API keys for the model and search services
#[derive(Clone)]
pub struct Credentials {
    /// Model service key
    pub groq_api_key: String,
    /// Web search service key
    pub tavily_api_key: String,
}

impl Credentials {
    pub const GROQ_API_KEY: &'static str = "GROQ_API_KEY";
    pub const TAVILY_API_KEY: &'static str = "TAVILY_API_KEY";

    /// Read both keys from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read both keys through `lookup`; empty values count as missing
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let fetch = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(MindError::MissingCredential(key))
        };

        Ok(Self {
            groq_api_key: fetch(Self::GROQ_API_KEY)?,
            tavily_api_key: fetch(Self::TAVILY_API_KEY)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("groq_api_key", &"<redacted>")
            .field("tavily_api_key", &"<redacted>")
            .finish()
    }
}
