//! Configuration management for the console client
//!
//! Everything has a sensible default; the only environment override is the
//! API base URL (`MARITIME_API_URL`, also read from a `.env` file).

use crate::{Error, Result};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Environment variable overriding the API base URL
pub const BASE_URL_ENV: &str = "MARITIME_API_URL";

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Default timeout for ordinary calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for calls that may involve heavy remote processing (agent queries)
pub const EXTENDED_TIMEOUT: Duration = Duration::from_secs(60);

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(Error::Config(format!(
                "Invalid log format: {}. Valid options: pretty, json",
                s
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level filter, used when `RUST_LOG` is unset
    pub level: String,
    /// Log format
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info,maritime_console=debug".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base URL, e.g. `http://localhost:8000/api`
    pub base_url: String,
    /// Explicit health probe URL; derived from `base_url` when unset
    pub health_url: Option<String>,
    /// Timeout for ordinary calls
    #[serde(with = "humantime_serde")]
    pub default_timeout: Duration,
    /// Timeout for agent queries
    #[serde(with = "humantime_serde")]
    pub extended_timeout: Duration,
    /// Logging settings
    pub log: LogConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            health_url: None,
            default_timeout: DEFAULT_TIMEOUT,
            extended_timeout: EXTENDED_TIMEOUT,
            log: LogConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a config for the given base URL, all other settings default
    pub fn new(base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Load configuration from the environment
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut config = ClientConfig::default();
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the default timeout
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set the extended (agent query) timeout
    pub fn with_extended_timeout(mut self, timeout: Duration) -> Self {
        self.extended_timeout = timeout;
        self
    }

    /// Set an explicit health probe URL
    pub fn with_health_url(mut self, url: impl Into<String>) -> Self {
        self.health_url = Some(url.into());
        self
    }

    /// Base URL without a trailing slash
    pub fn api_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Service root: the base URL with a trailing `/api` segment removed
    pub fn service_root(&self) -> &str {
        let base = self.api_base();
        base.strip_suffix("/api").unwrap_or(base)
    }

    /// URL probed by the connection test
    pub fn health_probe_url(&self) -> String {
        match self.health_url {
            Some(ref url) => url.clone(),
            None => format!("{}/health", self.service_root()),
        }
    }

    /// Validate URLs and timeouts
    pub fn validate(&self) -> Result<()> {
        check_url("base_url", self.api_base())?;
        check_url("health_url", &self.health_probe_url())?;
        if self.default_timeout.is_zero() {
            return Err(Error::Config("default_timeout must be greater than zero".to_string()));
        }
        if self.extended_timeout.is_zero() {
            return Err(Error::Config("extended_timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn check_url(field: &str, raw: &str) -> Result<()> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", field, raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Config(format!(
            "Invalid {} '{}': unsupported scheme {}",
            field, raw, other
        ))),
    }
}
