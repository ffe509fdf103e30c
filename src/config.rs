use crate::lookup::WriteMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "CV_API_KEY";
pub const USER_AGENT_ENV: &str = "CV_FETCHER_USER_AGENT";

/// Application configuration loaded from ~/.config/cbztag/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub comicvine: ComicVineConfig,
    #[serde(default)]
    pub tagging: TaggingConfig,
}

/// Connection settings for the ComicVine API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComicVineConfig {
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after a rate-limit response
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_rate_limit_wait_secs")]
    pub rate_limit_wait_secs: u64,
}

fn default_base_url() -> String {
    "https://comicvine.gamespot.com/api/".to_string()
}

fn default_user_agent() -> String {
    format!("cbztag/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit_wait_secs() -> u64 {
    5
}

impl Default for ComicVineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            rate_limit_wait_secs: default_rate_limit_wait_secs(),
        }
    }
}

impl ComicVineConfig {
    /// The configured key, ignoring blank values
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Defaults for the tag command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggingConfig {
    /// "merge" or "overwrite"
    pub mode: Option<String>,

    /// Filled into LanguageISO when the source has none; empty disables
    #[serde(default = "default_language")]
    pub language: Option<String>,

    #[serde(default)]
    pub rename: bool,
}

fn default_language() -> Option<String> {
    Some("en".to_string())
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            mode: None,
            language: default_language(),
            rename: false,
        }
    }
}

impl Config {
    /// Load configuration from the default path, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_overrides(
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(USER_AGENT_ENV).ok(),
        );
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("cbztag").join("config.toml"))
    }

    /// Environment values win over the file when set and non-empty
    fn apply_overrides(&mut self, api_key: Option<String>, user_agent: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.comicvine.api_key = Some(key);
        }
        if let Some(agent) = user_agent.filter(|a| !a.trim().is_empty()) {
            self.comicvine.user_agent = agent;
        }
    }

    /// Get the write mode, with `--overwrite-all` taking precedence
    pub fn write_mode(&self, overwrite_all: bool) -> Result<WriteMode> {
        if overwrite_all {
            return Ok(WriteMode::Overwrite);
        }
        match self.tagging.mode.as_deref() {
            Some(mode) => mode
                .parse::<WriteMode>()
                .with_context(|| format!("Invalid [tagging] mode in {:?}", Self::config_path().ok())),
            None => Ok(WriteMode::default()),
        }
    }

    pub fn rename(&self, cli_override: bool) -> bool {
        cli_override || self.tagging.rename
    }

    pub fn language(&self) -> Option<&str> {
        self.tagging
            .language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}
