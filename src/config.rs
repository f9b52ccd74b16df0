//! Application configuration management.
//!
//! Defaults for scan settings are read from `config.json` in the
//! platform-specific configuration directory. Command-line flags override
//! anything set here.
//!
//! ```json
//! {
//!   "concurrency": 8,
//!   "detail": 200,
//!   "max_size": 1073741824,
//!   "patterns": ["\\.jpe?g$", "\\.png$"]
//! }
//! ```

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::duplicates::{DEFAULT_CONCURRENCY, DEFAULT_DETAIL};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of concurrent hashing tasks.
    pub concurrency: usize,
    /// Progress line interval in files (0 disables).
    pub detail: usize,
    /// Size ceiling in bytes; `None` or 0 means unlimited.
    pub max_size: Option<u64>,
    /// Base-name regex patterns; empty matches everything.
    pub patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            detail: DEFAULT_DETAIL,
            max_size: None,
            patterns: Vec::new(),
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    ///
    /// Never fails: a missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        match Self::load_internal() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    fn load_internal() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load the configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Save the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "dupescan", "dupescan")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.json"))
    }
}
