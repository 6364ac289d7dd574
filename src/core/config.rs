//! Configuration handling for Rinth
//!
//! Supports rinth.toml (global and per-directory) and environment variable
//! overrides.

use std::env;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::core::{RinthError, RinthResult};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote API configuration
    pub api: ApiConfig,

    /// Sync behavior configuration
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the Modrinth API
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Maximum retries for rate-limited requests
    pub rate_limit_retries: u32,

    /// User agent sent with every request
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum concurrent project tasks
    pub concurrency: usize,

    /// Root directory holding the content category directories
    pub root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.modrinth.com".to_string(),
            timeout: 30,
            rate_limit_retries: 5,
            user_agent: format!("rinth/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            root: None,
        }
    }
}

impl Config {
    /// Load configuration with the standard precedence:
    /// defaults < global rinth.toml < ./rinth.toml < RINTH_* environment
    pub fn load(dir: &Path) -> RinthResult<Self> {
        let mut config = Config::default();

        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                config = Self::read_file(&global)?;
            }
        }

        let local = dir.join("rinth.toml");
        if local.exists() {
            config = Self::read_file(&local)?;
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Path of the per-user global config file, if a home directory exists
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("rs", "rinth", "rinth").map(|dirs| dirs.config_dir().join("rinth.toml"))
    }

    fn read_file(path: &Path) -> RinthResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn apply_env_overrides(&mut self) -> RinthResult<()> {
        if let Ok(url) = env::var("RINTH_API_URL") {
            self.api.base_url = url;
        }

        if let Ok(timeout) = env::var("RINTH_TIMEOUT") {
            self.api.timeout = timeout
                .parse()
                .map_err(|_| RinthError::config(format!("invalid RINTH_TIMEOUT: {}", timeout)))?;
        }

        if let Ok(concurrency) = env::var("RINTH_CONCURRENCY") {
            self.sync.concurrency = concurrency.parse().map_err(|_| {
                RinthError::config(format!("invalid RINTH_CONCURRENCY: {}", concurrency))
            })?;
        }

        if let Ok(root) = env::var("RINTH_ROOT") {
            self.sync.root = Some(PathBuf::from(root));
        }

        Ok(())
    }

    /// Resolve the sync root, preferring an explicit CLI value
    pub fn sync_root(&self, cli_root: Option<&Path>) -> RinthResult<PathBuf> {
        if let Some(root) = cli_root {
            return Ok(root.to_path_buf());
        }
        if let Some(ref root) = self.sync.root {
            return Ok(root.clone());
        }
        Ok(env::current_dir()?)
    }
}
