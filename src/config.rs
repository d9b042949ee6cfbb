//! Configuration file parser for ~/.config/newsdash/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as warnings, since they are
//! usually typos.
use crate::api::DEFAULT_BASE_URL;
use crate::controller::{FeedPage, FeedSettings};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the configured API base URL.
pub const API_URL_ENV: &str = "NEWSDASH_API_URL";

const KNOWN_KEYS: [&str; 7] = [
    "api_url",
    "request_timeout_secs",
    "ui_timeout_secs",
    "refresh_delay_secs",
    "dashboard_limit",
    "category_limit",
    "keybindings",
];

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Top-level application configuration.
///
/// Every field is defaulted, so any subset of keys may be given.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// News API base URL. `None` falls through to the built-in default.
    pub api_url: Option<String>,

    /// Transport timeout for a single HTTP request, in seconds.
    pub request_timeout_secs: u64,

    /// How long a page may stay in its loading state, in seconds.
    pub ui_timeout_secs: u64,

    /// Delay between a successful backend trigger and the re-fetch, in seconds.
    pub refresh_delay_secs: u64,

    /// `limit` for the dashboard list.
    pub dashboard_limit: u32,

    /// `limit` for the categories page list.
    pub category_limit: u32,

    /// Keybinding overrides: action name → key string.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout_secs: 30,
            ui_timeout_secs: 15,
            refresh_delay_secs: 2,
            dashboard_limit: 50,
            category_limit: 100,
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    /// - Zero timeouts or limits → replaced by their defaults, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(&content)?;
        config.replace_zero_values();
        tracing::info!(
            path = %path.display(),
            api_url = ?config.api_url,
            "Loaded configuration"
        );
        Ok(config)
    }

    fn replace_zero_values(&mut self) {
        let defaults = Self::default();
        let fix = |name: &str, value: &mut u64, default: u64| {
            if *value == 0 {
                tracing::warn!(key = name, default, "Zero is not allowed, using default");
                *value = default;
            }
        };
        fix(
            "request_timeout_secs",
            &mut self.request_timeout_secs,
            defaults.request_timeout_secs,
        );
        fix("ui_timeout_secs", &mut self.ui_timeout_secs, defaults.ui_timeout_secs);

        if self.dashboard_limit == 0 {
            tracing::warn!(key = "dashboard_limit", "Zero is not allowed, using default");
            self.dashboard_limit = defaults.dashboard_limit;
        }
        if self.category_limit == 0 {
            tracing::warn!(key = "category_limit", "Zero is not allowed, using default");
            self.category_limit = defaults.category_limit;
        }
    }

    /// Resolve the API base URL: CLI flag, then environment, then file, then
    /// the built-in default. Blank values are skipped.
    pub fn resolve_api_url(&self, cli: Option<&str>, env: Option<&str>) -> String {
        [cli, env, self.api_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn ui_timeout(&self) -> Duration {
        Duration::from_secs(self.ui_timeout_secs)
    }

    /// Controller settings for a list page. Only the categories page waits
    /// for a category before fetching.
    pub fn feed_settings(&self, page: FeedPage) -> FeedSettings {
        let (limit, require_category) = match page {
            FeedPage::Dashboard => (self.dashboard_limit, false),
            FeedPage::Categories => (self.category_limit, true),
        };
        FeedSettings {
            limit,
            ui_timeout: self.ui_timeout(),
            refresh_delay: Duration::from_secs(self.refresh_delay_secs),
            require_category,
        }
    }
}

/// Default config file location (`$XDG_CONFIG_HOME/newsdash/config.toml`,
/// falling back to `~/.config`).
pub fn default_config_path() -> Option<std::path::PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(std::path::PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;
    Some(base.join("newsdash").join("config.toml"))
}

// ============================================================================
// Tests
// ============================================================================
