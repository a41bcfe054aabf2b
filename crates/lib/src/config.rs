//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.localchat/config.json`) and
//! environment. A missing file falls back to defaults so the server runs out of
//! the box against a local Ollama instance.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Web server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Ollama backend settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Chat defaults (model, generation parameters, poll cadence).
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Web server bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for HTTP (default 7171).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    7171
}

fn default_server_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// Ollama backend settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OllamaConfig {
    /// Base URL of the Ollama HTTP API. Overridden by OLLAMA_BASE_URL env.
    /// When absent, the client default (http://127.0.0.1:11434) is used.
    pub base_url: Option<String>,
}

/// Chat defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatConfig {
    /// Default model: use the exact name from `ollama list` (e.g. "llama3.2:1b").
    /// When unset, the poller selects the first discovered model.
    pub default_model: Option<String>,

    /// Default sampling temperature in [0, 1] (default 0.7).
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Default completion length cap (default 2048).
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Seconds between availability/model-discovery polls (default 5).
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Resolve the Ollama base URL: env OLLAMA_BASE_URL overrides config.
pub fn resolve_ollama_base_url(config: &Config) -> Option<String> {
    std::env::var("OLLAMA_BASE_URL")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .ollama
                .base_url
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the default model name: env LOCALCHAT_DEFAULT_MODEL overrides config.
pub fn resolve_default_model(config: &Config) -> Option<String> {
    std::env::var("LOCALCHAT_DEFAULT_MODEL")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .chat
                .default_model
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("LOCALCHAT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".localchat").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or LOCALCHAT_CONFIG_PATH). Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing config from {}", path.display()))
}
