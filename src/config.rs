//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.storepulse.toml` files. Credentials never live here; they come from
//! the environment (see `cli`).

use crate::models::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
use crate::sources::analytics::DEFAULT_API_URL;
use crate::sources::auth::DEFAULT_TOKEN_URL;
use crate::sources::orders::{DEFAULT_API_VERSION, MAX_PAGE_SIZE};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".storepulse.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Order API settings.
    #[serde(default)]
    pub orders: OrdersConfig,

    /// Reporting API settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Where and what to write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Summary file path, relative to the working directory.
    #[serde(default = "default_output_path")]
    pub path: String,

    /// Length of the trailing window in days.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            window_days: default_window_days(),
        }
    }
}

fn default_output_path() -> String {
    "data/storepulse.json".to_string()
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

/// Order API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersConfig {
    /// Admin API version segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Orders requested per page (capped at 250 by the API).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Override the store URL (proxies, test servers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            page_size: default_page_size(),
            base_url: None,
        }
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

/// Reporting API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_analytics_url")]
    pub api_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            api_url: default_analytics_url(),
            token_url: default_token_url(),
        }
    }
}

fn default_analytics_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

/// HTTP client settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout. Unset means wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.output.path = output.display().to_string();
        }
        if let Some(days) = args.days {
            self.output.window_days = days;
        }
        if let Some(timeout) = args.timeout {
            self.http.timeout_seconds = Some(timeout);
        }
    }

    /// Check values that can come from the file as well as the CLI.
    pub fn validate(&self) -> Result<()> {
        let days = self.output.window_days;
        if days == 0 || days > MAX_WINDOW_DAYS {
            bail!(
                "window_days must be between 1 and {} (got {})",
                MAX_WINDOW_DAYS,
                days
            );
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
