use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "RAGCHAT_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
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

    pub fn save_api_url(url: &str) -> Result<PathBuf> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.api_url = Some(url.trim().to_string());
        config.save()?;
        Self::get_config_path()
    }

    /// Backend base URL: CLI flag, then environment, then config file, then
    /// the local development default.
    pub fn api_url(&self, cli_override: Option<&str>) -> String {
        self.api_url_with_env(cli_override, std::env::var(API_URL_ENV).ok())
    }

    fn api_url_with_env(&self, cli_override: Option<&str>, env: Option<String>) -> String {
        let non_blank = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };

        cli_override
            .and_then(non_blank)
            .or_else(|| env.as_deref().and_then(non_blank))
            .or_else(|| self.api_url.as_deref().and_then(non_blank))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("ragchat").join("config.json"))
    }
}
