//! Configuration file handling.
//!
//! Reads from `~/.config/branchkeep/branchkeep.toml`

use anyhow::{Context, Result};
use branchkeep_core::DEFAULT_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `database_url` from the file.
pub const DATABASE_URL_ENV: &str = "BRANCHKEEP_DATABASE_URL";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root URL of the hosted JSON store, e.g. `https://<project>.firebaseio.com`.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Timeout applied to every store request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// File holding the scan history.
    #[serde(default = "default_scan_log_path")]
    pub scan_log_path: PathBuf,
    /// File remembering the signed-in user between invocations.
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("branchkeep")
}

fn default_scan_log_path() -> PathBuf {
    data_dir().join("scan_history.json")
}

fn default_session_path() -> PathBuf {
    data_dir().join("session.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            scan_log_path: default_scan_log_path(),
            session_path: default_session_path(),
        }
    }
}

impl Config {
    /// Load configuration from the config file.
    ///
    /// If `custom_path` is provided, load from that path.
    /// Otherwise, load from the default XDG config location.
    /// Creates a default config file if it doesn't exist (only for default path).
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self> {
        let is_custom = custom_path.is_some();
        let config_path = match custom_path {
            Some(path) => path,
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            if !is_custom {
                let config = Config::default();
                config.save_to(&config_path)?;
                tracing::info!("Created default config at {}", config_path.display());
                return Ok(config);
            } else {
                anyhow::bail!("Config file not found: {}", config_path.display());
            }
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        tracing::debug!("Loaded config from {}: {:?}", config_path.display(), config);
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Apply `BRANCHKEEP_DATABASE_URL` if it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!("Using database URL from {}", DATABASE_URL_ENV);
                self.database_url = Some(url.trim().to_string());
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The configured store URL, or an error explaining how to set one.
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url.as_deref().with_context(|| {
            format!("No database_url configured (set it in the config file or {DATABASE_URL_ENV})")
        })
    }

    /// Get the path to the config file.
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("branchkeep").join("branchkeep.toml"))
    }
}
