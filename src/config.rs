use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub products_path: String,
    pub chat_path: String,
    pub compare_path: String,
    /// No timeout when unset; requests run until the network gives up.
    pub request_timeout_secs: Option<u64>,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            products_path: "/api/products".to_string(),
            chat_path: "/api/chatbot".to_string(),
            compare_path: "/api/compare".to_string(),
            request_timeout_secs: None,
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load from the user config file, then apply environment overrides.
    /// A default file is written on first run so there is something to edit.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_or_create(&config_path)
    }

    /// Defaults plus environment overrides, for when no file can be used.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            Self::default().save_to(path).with_context(|| {
                format!("Could not write default config to {}", path.display())
            })?;
        }
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MANUALS_BASE_URL") {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
        if let Ok(level) = std::env::var("MANUALS_LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.log_level = level.trim().to_string();
            }
        }
    }

    /// Full URL for an endpoint path, tolerating a trailing slash on the base.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.log_dir {
            return Ok(dir.clone());
        }
        Ok(Self::get_config_dir()?.join("logs"))
    }

    fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("manual-intelligence"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.json"))
    }
}
