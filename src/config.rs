//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::filter::TopicLayout;
use crate::geometry::{DrawnShape, GeometryError};
use crate::sync::{RetryPolicy, SynchronizerOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub broker: BrokerConfig,

    #[serde(default)]
    pub topic: TopicConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Regions subscribed at startup
    #[serde(default)]
    pub regions: Vec<RegionConfig>,
}

/// Broker session configuration.
///
/// Reserved for a networked transport. The loopback runtime only reports
/// the url, VPN and username; the password is never read or logged.
#[derive(Clone, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_broker_url")]
    pub url: String,

    #[serde(default = "default_vpn_name")]
    pub vpn_name: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

fn default_broker_url() -> String {
    "ws://localhost:8000".to_string()
}

fn default_vpn_name() -> String {
    "default".to_string()
}

fn default_username() -> String {
    "default".to_string()
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: default_broker_url(),
            vpn_name: default_vpn_name(),
            username: default_username(),
            password: String::new(),
        }
    }
}

impl std::fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("url", &self.url)
            .field("vpn_name", &self.vpn_name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Topic tree configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TopicConfig {
    #[serde(default = "default_topic_root")]
    pub root: String,

    #[serde(default = "default_topic_feed")]
    pub feed: String,
}

fn default_topic_root() -> String {
    "FDPS".to_string()
}

fn default_topic_feed() -> String {
    "position".to_string()
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            root: default_topic_root(),
            feed: default_topic_feed(),
        }
    }
}

impl TopicConfig {
    pub fn layout(&self) -> TopicLayout {
        TopicLayout::new(self.root.clone(), self.feed.clone())
    }
}

/// Subscription sync configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    #[serde(default = "default_retry_attempts")]
    pub retry_max_attempts: u32,

    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

fn default_debounce() -> u64 {
    500
}

fn default_retry_attempts() -> u32 {
    1
}

fn default_retry_backoff() -> u64 {
    250
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            retry_max_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

impl SyncConfig {
    pub fn options(&self) -> SynchronizerOptions {
        SynchronizerOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            retry: RetryPolicy::new(
                self.retry_max_attempts,
                Duration::from_millis(self.retry_backoff_ms),
            ),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

/// A rectangle given by its bounds in degrees
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RegionConfig {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl RegionConfig {
    pub fn to_shape(&self) -> DrawnShape {
        DrawnShape::rectangle(self.min_lat, self.max_lat, self.min_lon, self.max_lon)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("geofilter").join("config.toml")),
            Some(PathBuf::from("/etc/geofilter/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Check that every configured region is a usable rectangle
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, region) in self.regions.iter().enumerate() {
            region
                .to_shape()
                .to_region()
                .map_err(|error| ConfigError::InvalidRegion { index, error })?;
        }
        Ok(())
    }

    /// Configured regions as drawn shapes
    pub fn region_shapes(&self) -> Vec<DrawnShape> {
        self.regions.iter().map(RegionConfig::to_shape).collect()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply `GEOFILTER_*` overrides read through `lookup`
    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Broker overrides
        if let Some(url) = lookup("GEOFILTER_BROKER_URL") {
            self.broker.url = url;
        }
        if let Some(vpn) = lookup("GEOFILTER_BROKER_VPN") {
            self.broker.vpn_name = vpn;
        }
        if let Some(username) = lookup("GEOFILTER_BROKER_USERNAME") {
            self.broker.username = username;
        }
        if let Some(password) = lookup("GEOFILTER_BROKER_PASSWORD") {
            self.broker.password = password;
        }

        // Topic overrides
        if let Some(root) = lookup("GEOFILTER_TOPIC_ROOT") {
            self.topic.root = root;
        }
        if let Some(feed) = lookup("GEOFILTER_TOPIC_FEED") {
            self.topic.feed = feed;
        }

        // Sync overrides
        if let Some(debounce) = lookup("GEOFILTER_DEBOUNCE_MS") {
            match debounce.parse() {
                Ok(ms) => self.sync.debounce_ms = ms,
                Err(_) => tracing::warn!(value = %debounce, "Ignoring invalid GEOFILTER_DEBOUNCE_MS"),
            }
        }
        if let Some(attempts) = lookup("GEOFILTER_RETRY_MAX_ATTEMPTS") {
            match attempts.parse() {
                Ok(n) => self.sync.retry_max_attempts = n,
                Err(_) => tracing::warn!(value = %attempts, "Ignoring invalid GEOFILTER_RETRY_MAX_ATTEMPTS"),
            }
        }
        if let Some(backoff) = lookup("GEOFILTER_RETRY_BACKOFF_MS") {
            match backoff.parse() {
                Ok(ms) => self.sync.retry_backoff_ms = ms,
                Err(_) => tracing::warn!(value = %backoff, "Ignoring invalid GEOFILTER_RETRY_BACKOFF_MS"),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("GEOFILTER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("GEOFILTER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Region {index} is unusable: {error}")]
    InvalidRegion { index: usize, error: GeometryError },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Geofilter Configuration
#
# Environment variables override these settings:
# - GEOFILTER_BROKER_URL
# - GEOFILTER_BROKER_VPN
# - GEOFILTER_BROKER_USERNAME
# - GEOFILTER_BROKER_PASSWORD
# - GEOFILTER_TOPIC_ROOT
# - GEOFILTER_TOPIC_FEED
# - GEOFILTER_DEBOUNCE_MS
# - GEOFILTER_RETRY_MAX_ATTEMPTS
# - GEOFILTER_RETRY_BACKOFF_MS
# - GEOFILTER_LOG_LEVEL
# - GEOFILTER_LOG_FORMAT

[broker]
# Reserved for a networked transport; the loopback runtime only logs these
# Broker WebSocket URL
url = "ws://localhost:8000"

# Message VPN to join
vpn_name = "default"

# Client credentials
username = "default"
password = ""

[topic]
# First two levels of every flight position topic
root = "FDPS"
feed = "position"

[sync]
# Quiet window before a region edit is committed (ms)
debounce_ms = 500

# Attempts per subscribe call; 1 disables retry
retry_max_attempts = 1

# Delay before the first retry, doubled on each further retry (ms)
retry_backoff_ms = 250

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/geofilter/geofilter.log"

# Regions subscribed at startup. With none, the whole feed is subscribed.
# [[regions]]
# min_lat = 35.0
# max_lat = 36.0
# min_lon = -100.0
# max_lon = -99.0
"#
    .to_string()
}
