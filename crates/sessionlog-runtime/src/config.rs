use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sessionlog_engine::DEFAULT_CAPACITY;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolve the config file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. SESSIONLOG_CONFIG environment variable (with tilde expansion)
/// 3. XDG config directory
/// 4. ~/.sessionlog/config.toml (fallback for systems without XDG)
pub fn resolve_config_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("SESSIONLOG_CONFIG") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("sessionlog").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".sessionlog").join("config.toml"));
    }

    Err(Error::Config(
        "Could not determine config path: no HOME directory or XDG config directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_local_schemes() -> Vec<String> {
    vec!["local".to_string(), "file".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of retained events
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Session schemes accepted by `log` and `invoke_providers`.
    /// An empty list accepts every session.
    #[serde(default = "default_local_schemes")]
    pub local_schemes: Vec<String>,

    /// Deadline attached to each pipeline token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_timeout_ms: Option<u64>,

    /// Drop provider results that arrive after their pipeline was cancelled
    #[serde(default)]
    pub discard_after_cancel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            local_schemes: default_local_schemes(),
            provider_timeout_ms: None,
            discard_after_cancel: false,
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout_ms.map(Duration::from_millis)
    }
}
