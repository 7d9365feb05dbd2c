//! Configuration management for Pastecast
//!
//! Configuration is optional: every field has a default, and a missing config
//! file means "use the built-in platforms with a 15 second timeout".
//!
//! ```toml
//! [publish]
//! timeout = "15s"
//! max_attempts = 1
//! retry_backoff = "1s"
//!
//! [defaults]
//! platforms = ["telegraph", "paste-rs", "rentry"]
//!
//! [platforms.hastebin]
//! base_url = "https://haste.example.org"
//!
//! [platforms.catbox]
//! enabled = false
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

pub const DEFAULT_TIMEOUT: &str = "15s";
pub const DEFAULT_RETRY_BACKOFF: &str = "1s";
pub const DEFAULT_USER_AGENT: &str = concat!("pastecast/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub publish: PublishConfig,
    pub defaults: DefaultsConfig,
    /// Per-platform overrides keyed by platform name
    pub platforms: BTreeMap<String, PlatformConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Per-adapter deadline, humantime format ("15s", "500ms")
    pub timeout: String,
    pub user_agent: String,
    /// Attempts per adapter, including the first one
    pub max_attempts: u32,
    /// Base delay between attempts, doubled after each retry
    pub retry_backoff: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_attempts: 1,
            retry_backoff: DEFAULT_RETRY_BACKOFF.to_string(),
        }
    }
}

impl PublishConfig {
    pub fn timeout(&self) -> Result<Duration> {
        parse_duration("publish.timeout", &self.timeout)
    }

    pub fn retry_backoff(&self) -> Result<Duration> {
        parse_duration("publish.retry_backoff", &self.retry_backoff)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Bulk selection used when the caller names no platforms
    pub platforms: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub enabled: bool,
    /// Replaces the public endpoint (self-hosted instances, tests)
    pub base_url: Option<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file is not an error; defaults are returned instead.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.publish.timeout()?.is_zero() {
            return Err(invalid("publish.timeout", "must be greater than zero"));
        }

        self.publish.retry_backoff()?;

        if self.publish.max_attempts == 0 {
            return Err(invalid("publish.max_attempts", "must be at least 1"));
        }

        if self.publish.user_agent.trim().is_empty() {
            return Err(invalid("publish.user_agent", "cannot be empty"));
        }

        for (name, platform) in &self.platforms {
            if let Some(base_url) = &platform.base_url {
                if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                    return Err(invalid(
                        &format!("platforms.{}.base_url", name),
                        "must start with http:// or https://",
                    ));
                }
            }
        }

        if let Some(defaults) = &self.defaults.platforms {
            if defaults.iter().any(|p| p.trim().is_empty()) {
                return Err(invalid("defaults.platforms", "contains an empty name"));
            }
        }

        Ok(())
    }

    /// Override for one platform, looked up case-insensitively
    pub fn platform(&self, key: &str) -> Option<&PlatformConfig> {
        self.platforms
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, config)| config)
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value.trim()).map_err(|e| invalid(field, &e.to_string()))
}

fn invalid(field: &str, reason: &str) -> crate::error::PastecastError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("PASTECAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("pastecast").join("config.toml"))
}
