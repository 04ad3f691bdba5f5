//! Global configuration types for Amora.
//!
//! `AmoraConfig` represents the top-level `config.toml`. Every section and
//! field has a default, so an empty file (or no file) is a valid config.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.amora/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmoraConfig {
    #[serde(default)]
    pub mood: MoodConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub feeds: FeedConfig,
}

/// Activity engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodConfig {
    /// Cadence of the decay tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Activity level a new session starts at.
    #[serde(default = "default_seed_level")]
    pub seed_level: u8,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_seed_level() -> u8 {
    50
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            seed_level: default_seed_level(),
        }
    }
}

/// Notification permission polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    60
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Object store settings for signed uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Folder every upload is placed under.
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Base URL public links are built from. Defaults to a `file://` URL
    /// under the data directory when unset.
    #[serde(default)]
    pub public_base_url: Option<String>,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
}

fn default_folder() -> String {
    "amora".to_string()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            folder: default_folder(),
            public_base_url: None,
            api_key: String::new(),
            api_secret: String::new(),
        }
    }
}

/// Overrides for content feed sizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// When set, caps every feed at this many documents.
    #[serde(default)]
    pub max_results: Option<u32>,
}
