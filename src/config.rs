use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Client configuration, stored at `~/.rosachat/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the assistant backend.
    pub backend_url: String,

    /// Diagnostic log file. Relative paths resolve under the rosachat home.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".rosachat"))
    }

    /// Load configuration, writing a default config file on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::home_dir()?.join("config.toml");
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    fn load_from(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::home_dir()?.join("config.toml");
        self.save_to(&config_path)
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir).context("Failed to create .rosachat directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Resolved path of the diagnostic log file.
    pub fn log_path(&self) -> Result<PathBuf> {
        let home = Self::home_dir()?;
        Ok(match &self.log_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => home.join(path),
            None => home.join("rosachat.log"),
        })
    }
}
