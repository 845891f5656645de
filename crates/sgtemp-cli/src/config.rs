//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Database file
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Air-temperature API base URL
    #[serde(default)]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Default station ID
    #[serde(default)]
    pub station: Option<String>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sgtemp")
            .join("config.toml")
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from a specific file, or return default if not found
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Resolve the station filter from arg, env var, or config.
///
/// `ALL` (any case) or an empty value means no filter.
pub fn resolve_station(station: Option<String>, config: &Config) -> Option<String> {
    station
        .or_else(|| config.station.clone())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
}

/// Resolve the database path from arg, env var, config, or platform default.
pub fn resolve_database(database: Option<PathBuf>, config: &Config) -> PathBuf {
    database
        .or_else(|| config.database.clone())
        .unwrap_or_else(sgtemp_store::default_db_path)
}

/// Resolve the API base URL from arg, env var, config, or the public endpoint.
pub fn resolve_api_url(api_url: Option<String>, config: &Config) -> String {
    api_url
        .or_else(|| config.api_url.clone())
        .unwrap_or_else(|| sgtemp_core::client::DEFAULT_BASE_URL.to_string())
}

/// Resolve the request timeout from arg, config, or the client default.
pub fn resolve_timeout(timeout: Option<u64>, config: &Config) -> Duration {
    timeout
        .or(config.timeout)
        .map(Duration::from_secs)
        .unwrap_or(sgtemp_core::client::DEFAULT_TIMEOUT)
}
