//! # Configuration Management Module
//!
//! Central configuration for the FreeDATA auto-responder. A single [`Config`]
//! value is loaded once at startup and handed to each component; nothing reads
//! process-wide globals.
//!
//! ## Configuration Structure
//!
//! - [`GatewayConfig`] - Where the FreeDATA API lives and how long to wait for it
//! - [`BotConfig`] - Trigger phrase, canned reply, loop guard and poll cadence
//! - [`StorageConfig`] - Where the last-replied state is persisted
//! - [`LoggingConfig`] - Log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use freedata_bot::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     config.validate()?;
//!
//!     println!("Gateway: {}", config.gateway.base_url);
//!     println!("Trigger: {}", config.bot.trigger);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [gateway]
//! base_url = "http://localhost:5000"
//! expected_name = "FreeDATA API"
//! messages_path = "/freedata/messages"
//! radio_path = "/radio"
//! timeout_seconds = 10
//!
//! [bot]
//! trigger = "hello"
//! response = "Hello, I am away from the radio right now, but my FreeData BOT says Hello Back!"
//! self_signature = "my FreeData BOT says"
//! poll_interval_seconds = 15
//!
//! [storage]
//! data_dir = "./data"
//! state_key = "last_replied"
//!
//! [logging]
//! level = "info"
//! file = "freedata-bot.log"
//! ```

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

use crate::storage::is_valid_key;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the FreeDATA API, e.g. `http://localhost:5000`.
    pub base_url: String,
    /// Service name `GET /` must report; anything else aborts startup.
    #[serde(default = "default_expected_name")]
    pub expected_name: String,
    /// Path of the message list/send endpoint. FreeDATA serves it at `/freedata/messages`.
    #[serde(default = "default_messages_path")]
    pub messages_path: String,
    #[serde(default = "default_radio_path")]
    pub radio_path: String,
    /// Upper bound on every single gateway request, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_expected_name() -> String {
    "FreeDATA API".to_string()
}

fn default_messages_path() -> String {
    "/messages".to_string()
}

fn default_radio_path() -> String {
    "/radio".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            expected_name: default_expected_name(),
            messages_path: default_messages_path(),
            radio_path: default_radio_path(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl GatewayConfig {
    /// Join the base URL and an endpoint path without doubling or dropping the slash.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.is_empty() || path == "/" {
            return format!("{}/", base);
        }
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Case-insensitive substring that authorizes a reply.
    pub trigger: String,
    /// Canned reply text sent to the originator.
    pub response: String,
    /// Case-sensitive marker identifying our own reply when it is echoed back.
    pub self_signature: String,
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
}

fn default_poll_interval_seconds() -> u64 {
    15
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            trigger: "hello".to_string(),
            response: "Hello, I am away from the radio right now, but my FreeData BOT says Hello Back!"
                .to_string(),
            self_signature: "my FreeData BOT says".to_string(),
            poll_interval_seconds: default_poll_interval_seconds(),
        }
    }
}

impl BotConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    #[serde(default = "default_state_key")]
    pub state_key: String,
}

fn default_state_key() -> String {
    "last_replied".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            state_key: default_state_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("freedata-bot.log".to_string()),
        }
    }
}

impl LoggingConfig {
    /// Parse `level`; unknown names fall back to `info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject settings the responder cannot run safely with.
    pub fn validate(&self) -> Result<()> {
        let url = self.gateway.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("gateway.base_url must start with http:// or https:// (got '{}')", url);
        }
        if self.gateway.timeout_seconds == 0 {
            bail!("gateway.timeout_seconds must be at least 1");
        }
        if self.bot.trigger.trim().is_empty() {
            bail!("bot.trigger must not be empty");
        }
        if self.bot.self_signature.is_empty() {
            bail!("bot.self_signature must not be empty");
        }
        if !self.bot.response.contains(&self.bot.self_signature) {
            bail!(
                "bot.response must contain bot.self_signature ('{}') so echoed replies are recognised",
                self.bot.self_signature
            );
        }
        if self.bot.poll_interval_seconds == 0 {
            bail!("bot.poll_interval_seconds must be at least 1");
        }
        if !is_valid_key(&self.storage.state_key) {
            bail!(
                "storage.state_key '{}' must be a plain file name (letters, digits, '_', '-', '.'; no leading dot)",
                self.storage.state_key
            );
        }
        Ok(())
    }
}
