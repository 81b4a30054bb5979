use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::todo::StatusFilter;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a whole number of seconds, got {value:?}")]
    InvalidTimeout { key: &'static str, value: String },
    #[error("{key} must be one of all, completed, in-progress, got {value:?}")]
    InvalidStatusFilter { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    pub request_timeout: Duration,
    pub log_file: Option<PathBuf>,
    /// Status filter the list view starts with.
    pub initial_status: StatusFilter,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_API_URL.to_string(), request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS), log_file: None, initial_status: StatusFilter::All }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        // an empty URL means "use the default", matching same-origin deployments
        if let Some(url) = lookup("TODO_API_URL").map(|u| u.trim().trim_end_matches('/').to_string()) {
            if !url.is_empty() { config.api_url = url; }
        }
        if let Some(raw) = lookup("TODO_API_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidTimeout { key: "TODO_API_TIMEOUT_SECS", value: raw.clone() })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("TODO_STATUS_FILTER").filter(|s| !s.trim().is_empty()) {
            config.initial_status = raw.trim().parse().map_err(|_| ConfigError::InvalidStatusFilter { key: "TODO_STATUS_FILTER", value: raw.clone() })?;
        }
        config.log_file = lookup("TODO_LOG_FILE").filter(|p| !p.trim().is_empty()).map(PathBuf::from);
        Ok(config)
    }
}
