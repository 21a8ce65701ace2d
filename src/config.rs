//! Top-level application configuration.
//!
//! Configuration is stored in `.marketdesk/config.yaml` and includes:
//! - The admin API base URL and request timeout
//! - The access token (the `MARKETDESK_TOKEN` environment variable wins)
//! - Search debounce delay
//! - Per-resource page size overrides

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::CredentialProvider;
use crate::error::{DeskError, Result};

/// Directory holding the console's local state
pub const CONFIG_DIR: &str = ".marketdesk";

/// Environment variable that overrides the configured token
pub const TOKEN_ENV: &str = "MARKETDESK_TOKEN";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Admin API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Authentication
    #[serde(default)]
    pub auth: AuthConfig,

    /// Search input behavior
    #[serde(default, skip_serializing_if = "SearchConfig::is_default")]
    pub search: SearchConfig,

    /// Page size overrides keyed by resource name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub page_sizes: BTreeMap<String, u32>,
}

/// Admin API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: default_timeout(),
        }
    }
}

/// Authentication configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Search input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Idle delay before a typed search is committed (default: 300)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl SearchConfig {
    /// Check if this config has default values
    pub fn is_default(&self) -> bool {
        self.debounce_ms == default_debounce_ms()
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        PathBuf::from(CONFIG_DIR).join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get the access token from the environment or the config file
    pub fn token(&self) -> Option<String> {
        if let Ok(token) = env::var(TOKEN_ENV)
            && !token.is_empty()
        {
            return Some(token);
        }

        self.auth.token.clone().filter(|t| !t.is_empty())
    }

    /// Set the stored access token
    pub fn set_token(&mut self, token: String) {
        self.auth.token = Some(token);
    }

    /// Parsed API base URL. A trailing slash is added so resource paths
    /// join underneath it rather than replacing the last segment.
    pub fn base_url(&self) -> Result<Url> {
        let raw = self.api.base_url.as_deref().ok_or_else(|| {
            DeskError::Config(
                "API base URL not configured. Run: marketdesk config set api.base_url <url>"
                    .to_string(),
            )
        })?;
        parse_base_url(raw)
    }

    /// Set the API base URL after validating it
    pub fn set_base_url(&mut self, raw: &str) -> Result<()> {
        let url = parse_base_url(raw)?;
        self.api.base_url = Some(url.to_string());
        Ok(())
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout)
    }

    /// Debounce delay for typed search input
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    /// Page size for `resource`, falling back to the resource default
    pub fn page_size(&self, resource: &str, default: u32) -> u32 {
        self.page_sizes
            .get(resource)
            .copied()
            .filter(|size| *size > 0)
            .unwrap_or(default)
    }
}

impl CredentialProvider for Config {
    fn access_token(&self) -> Option<SecretString> {
        self.token().map(SecretString::from)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(DeskError::Config(format!(
            "'{raw}' cannot be used as an API base URL"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
