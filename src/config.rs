use crate::error::ConfigError;
use crate::graph::GraphLayout;
use std::time::Duration;

pub const ENV_API_URL: &str = "FLOWBOARD_API_URL";
pub const ENV_AUTH_HEADER: &str = "FLOWBOARD_AUTH_HEADER";
pub const ENV_REQUEST_TIMEOUT: &str = "FLOWBOARD_REQUEST_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT: &str = "FLOWBOARD_CONNECT_TIMEOUT_SECS";

/// Client settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// Header the session token is sent in.
    pub auth_header: String,
    pub request_timeout: Duration,
    /// Upper bound on waiting for a service authorization window.
    pub connect_timeout: Duration,
    pub layout: GraphLayout,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            auth_header: "x-access-token".to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(120),
            layout: GraphLayout::default(),
        }
    }
}

impl ClientConfig {
    /// Loads settings from the environment, reading a `.env` file first if
    /// one exists. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_API_URL) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    key: ENV_API_URL.to_string(),
                    value: url,
                    message: "expected an http(s) URL".to_string(),
                });
            }
            config.api_base_url = url;
        }
        if let Some(header) = lookup(ENV_AUTH_HEADER) {
            config.auth_header = header;
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT) {
            config.request_timeout = parse_secs(ENV_REQUEST_TIMEOUT, raw)?;
        }
        if let Some(raw) = lookup(ENV_CONNECT_TIMEOUT) {
            config.connect_timeout = parse_secs(ENV_CONNECT_TIMEOUT, raw)?;
        }
        Ok(config)
    }
}

fn parse_secs(key: &str, raw: String) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
            message: "expected a positive number of seconds".to_string(),
        }),
    }
}
