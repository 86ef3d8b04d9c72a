//! Configuration file support

use genesis_api::{HttpBackend, client::DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for genesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the backend
    pub backend_url: String,
    /// Timeout for `/chat`, in seconds
    pub chat_timeout_secs: u64,
    /// Timeout for `/health`, in seconds
    pub health_timeout_secs: u64,
    /// Re-check `/health` this often while the TUI runs. Off when unset or 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_interval_secs: Option<u64>,
    /// Sent along with every chat request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Whether to use TUI mode by default
    pub tui: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BASE_URL.to_string(),
            chat_timeout_secs: 30,
            health_timeout_secs: 5,
            health_interval_secs: None,
            user_id: None,
            tui: true,
        }
    }
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("genesis")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("GENESIS_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Where TUI mode writes its log
    pub fn log_path() -> PathBuf {
        Self::config_dir().join("genesis.log")
    }

    /// Load config from the default location, then apply environment overrides
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
            .with_backend_url_override(std::env::var("GENESIS_BACKEND_URL").ok())
    }

    /// Load config from `path`. Missing files give the defaults; unreadable
    /// or malformed files warn and give the defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Replace the backend URL when an override is present and non-empty
    pub fn with_backend_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.backend_url = url;
        }
        self
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    /// Build the HTTP backend described by this config
    pub fn http_backend(&self) -> HttpBackend {
        HttpBackend::new(&self.backend_url)
            .with_chat_timeout(Duration::from_secs(self.chat_timeout_secs))
            .with_health_timeout(Duration::from_secs(self.health_timeout_secs))
    }

    /// Periodic probe interval, if enabled
    pub fn health_interval(&self) -> Option<Duration> {
        self.health_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# genesis configuration file
# Place at ~/.config/genesis/config.toml (Linux), ~/Library/Application Support/genesis/config.toml (Mac)
# or %APPDATA%\genesis\config.toml (Windows). GENESIS_CONFIG_PATH overrides the location.

# Backend base URL (GENESIS_BACKEND_URL and --backend-url take precedence)
backend_url = "http://localhost:8002"

# Request timeouts in seconds
chat_timeout_secs = 30
health_timeout_secs = 5

# Re-check backend health periodically while the TUI runs (optional)
# health_interval_secs = 15

# Attach a user id to every chat request (optional)
# user_id = "alice"

# Whether to use TUI mode by default
# Set to false for simple stdin/stdout mode
tui = true
"#
}
