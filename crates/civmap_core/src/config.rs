//! Client configuration.
//!
//! # Responsibility
//! - Resolve service and media locations, timeout and logging settings.
//! - Read overrides from `CIVMAP_*` environment variables.
//!
//! # Invariants
//! - Base URLs are absolute `http`/`https` URLs.
//! - No request timeout applies unless one is configured.

use crate::logging::{default_log_level, normalize_level, LogSettings};
use reqwest::Url;
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";

pub const ENV_API_BASE_URL: &str = "CIVMAP_API_BASE_URL";
pub const ENV_MEDIA_BASE_URL: &str = "CIVMAP_MEDIA_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "CIVMAP_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "CIVMAP_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CIVMAP_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `source` names where the value came from: an env var or a CLI flag.
    InvalidUrl { source: &'static str, value: String },
    InvalidTimeout(String),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl { source, value } => {
                write!(f, "{source} must be an absolute http(s) url, got `{value}`")
            }
            Self::InvalidTimeout(value) => {
                write!(f, "timeout must be a positive number of seconds, got `{value}`")
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {}

/// Settings for one map client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Root of the `/civilizations` REST service.
    pub api_base_url: Url,
    /// Prefix for relative image references.
    pub media_base_url: Url,
    pub request_timeout: Option<Duration>,
    pub log: LogSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let base = Url::parse(DEFAULT_API_BASE_URL).expect("default api url is valid");
        Self {
            api_base_url: base.clone(),
            media_base_url: base,
            request_timeout: None,
            log: LogSettings::new(default_log_level()),
        }
    }
}

impl ClientConfig {
    /// Builds a config pointing both API and media at `api_base_url`.
    pub fn for_base_url(api_base_url: &str) -> Result<Self, ConfigError> {
        let base = parse_base_url(ENV_API_BASE_URL, api_base_url)?;
        Ok(Self {
            api_base_url: base.clone(),
            media_base_url: base,
            ..Self::default()
        })
    }

    /// Reads `CIVMAP_*` overrides on top of the defaults.
    ///
    /// The media base falls back to the API base when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = read_env(ENV_API_BASE_URL) {
            config.api_base_url = parse_base_url(ENV_API_BASE_URL, &value)?;
        }
        config.media_base_url = match read_env(ENV_MEDIA_BASE_URL) {
            Some(value) => parse_base_url(ENV_MEDIA_BASE_URL, &value)?,
            None => config.api_base_url.clone(),
        };
        if let Some(value) = read_env(ENV_TIMEOUT_SECS) {
            config.request_timeout = Some(parse_timeout_secs(&value)?);
        }
        if let Some(value) = read_env(ENV_LOG_LEVEL) {
            let level = normalize_level(&value).map_err(ConfigError::InvalidLogLevel)?;
            config.log.level = level;
        }
        if let Some(value) = read_env(ENV_LOG_DIR) {
            config.log.log_dir = Some(PathBuf::from(value));
        }

        Ok(config)
    }
}

pub fn parse_base_url(source: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        source,
        value: value.to_string(),
    };
    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(url)
}

pub fn parse_timeout_secs(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(value.to_string())),
    }
}

fn read_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
