//! Configuration from the environment

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("HINT_COACH_BACKEND_URL must be an http(s) URL, got {0:?}")]
    InvalidBackendUrl(String),
    #[error("HINT_COACH_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachConfig {
    pub backend_url: String,
    /// `None` waits indefinitely
    pub request_timeout: Option<Duration>,
    pub preferences_path: PathBuf,
}

impl CoachConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_url = lookup("HINT_COACH_BACKEND_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        if !(backend_url.starts_with("http://") || backend_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBackendUrl(backend_url));
        }

        let request_timeout = match lookup("HINT_COACH_TIMEOUT_SECS") {
            None => None,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => return Err(ConfigError::InvalidTimeout(raw)),
            },
        };

        let preferences_path = lookup("HINT_COACH_PREFS_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.hint-coach/preferences.json"))
            },
            PathBuf::from,
        );

        Ok(Self {
            backend_url,
            request_timeout,
            preferences_path,
        })
    }
}
