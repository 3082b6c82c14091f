use anyhow::{Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.

/// Environment variable overriding the managed backend address
pub const API_URL_ENV: &str = "YTSUBS_API_URL";

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Preferred caption language code
    #[serde(default = "default_language")]
    pub language: String,

    /// Managed caption backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// In-process extraction
    #[serde(default)]
    pub direct: DirectConfig,

    /// Provider order and retry policy
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// HTTP service settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Caption provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: Managed caption backend over HTTP
    Backend,
    // @provider: In-process extraction
    Direct,
}

impl ProviderKind {
    // @returns: Lowercase provider identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::Direct => "direct",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "backend" => Ok(Self::Backend),
            "direct" => Ok(Self::Direct),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Managed backend configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BackendConfig {
    /// Base address of the backend
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// In-process extraction configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DirectConfig {
    /// Root of the video site
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DirectConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Retrieval strategy configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RetrievalConfig {
    /// Providers in the order they are tried; the first one is retried
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderKind>,

    /// Total attempts on the primary provider, first try included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait before the first retry, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// HTTP service configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_site_url() -> String {
    crate::providers::youtube::DEFAULT_SITE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_providers() -> Vec<ProviderKind> {
    vec![ProviderKind::Backend, ProviderKind::Direct]
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.language)?;

        if self.retrieval.providers.is_empty() {
            return Err(anyhow!("At least one caption provider must be configured"));
        }
        if self.retrieval.max_attempts == 0 {
            return Err(anyhow!("retrieval.max_attempts must be at least 1"));
        }
        if self.retrieval.retry_backoff_ms == 0 {
            return Err(anyhow!("retrieval.retry_backoff_ms must be greater than 0"));
        }
        if self.retrieval.providers.contains(&ProviderKind::Backend) {
            url::Url::parse(&self.backend.base_url)
                .map_err(|e| anyhow!("Invalid backend URL '{}': {}", self.backend.base_url, e))?;
        }

        Ok(())
    }

    /// Apply environment overrides through `lookup`
    ///
    /// `YTSUBS_API_URL` sets the backend address, `HOST` and `PORT` the
    /// service bind address. Unparsable ports are logged and ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.backend.base_url = url.trim().to_string();
        }
        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            self.server.host = host.trim().to_string();
        }
        if let Some(value) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            match value.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(e) => warn!("Ignoring invalid PORT value '{}': {}", value, e),
            }
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            language: default_language(),
            backend: BackendConfig::default(),
            direct: DirectConfig::default(),
            retrieval: RetrievalConfig::default(),
            server: ServerConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
