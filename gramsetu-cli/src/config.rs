//! Layered configuration
//!
//! Precedence, highest first: command-line flags, process environment
//! (`GRAMSETU_API_URL`, `GRAMSETU_BATCH_SIZE`), the user config file,
//! built-in defaults. The value is constructed once in main and passed
//! down explicitly; nothing reads configuration ambiently.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::import::DEFAULT_BATCH_SIZE;

pub const ENV_API_URL: &str = "GRAMSETU_API_URL";
pub const ENV_BATCH_SIZE: &str = "GRAMSETU_BATCH_SIZE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the GramSetu backend. No default: submission refuses
    /// to run until one is configured.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub batch_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Config {
    /// Read the config file (when present) and overlay environment
    /// variables. Flags are applied later by the command handlers.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
            _ => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// `<config_dir>/gramsetu/config.toml`
    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gramsetu").join("config.toml"))
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var(ENV_API_URL) {
            self.api.base_url = Some(url);
        }
        if let Some(raw) = var(ENV_BATCH_SIZE) {
            self.import.batch_size = parse_batch_size(&raw)
                .with_context(|| format!("Invalid {}: '{}'", ENV_BATCH_SIZE, raw))?;
        }
        Ok(())
    }

    /// The API base URL, or an error naming every way to set one.
    pub fn require_base_url(&self) -> Result<&str> {
        match self.api.base_url.as_deref() {
            Some(url) => Ok(url),
            None => {
                let file_hint = Self::config_file_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "the config file".to_string());
                bail!(
                    "No API base URL configured. Pass --api-url, set {}, or add [api] base_url to {}",
                    ENV_API_URL,
                    file_hint
                );
            }
        }
    }
}

pub fn parse_batch_size(raw: &str) -> Result<usize> {
    let size: usize = raw
        .trim()
        .parse()
        .context("batch size must be a positive integer")?;
    if size == 0 {
        bail!("batch size must be at least 1");
    }
    Ok(size)
}
