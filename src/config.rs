//! Configuration for the chat client and the stub backend.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default backend address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default port of the stub backend.
pub const DEFAULT_STUB_PORT: u16 = 8000;

const ENV_BASE_URL: &str = "URLCHAT_API_BASE_URL";
const ENV_MODE: &str = "URLCHAT_MODE";
const ENV_REQUEST_TIMEOUT: &str = "URLCHAT_REQUEST_TIMEOUT_SECS";
const ENV_SUPPRESS_TRANSPORT: &str = "URLCHAT_SUPPRESS_TRANSPORT_ERRORS";
const ENV_STUB_PORT: &str = "URLCHAT_STUB_PORT";

/// Invalid configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable holds a value that cannot be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Which backend flavour the controller talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Named, persisted sessions listed in a sidebar.
    #[default]
    #[serde(alias = "multi-session")]
    Multi,
    /// One ad-hoc session per page, `/load-url` + session-less `/ask`.
    Legacy,
}

impl DeploymentMode {
    /// Whether this mode has a session sidebar.
    #[must_use]
    pub const fn has_sessions(self) -> bool {
        matches!(self, Self::Multi)
    }
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multi" | "multi-session" | "sessions" => Ok(Self::Multi),
            "legacy" | "single" | "single-session" => Ok(Self::Legacy),
            other => Err(format!("unknown mode `{other}` (expected `multi` or `legacy`)")),
        }
    }
}

/// HTTP settings for reaching the backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Fixed base address every endpoint is resolved against.
    pub base_url: String,
    /// Whole-request timeout; `None` keeps the transport default (no limit).
    #[serde(default, with = "optional_duration_serde")]
    pub request_timeout: Option<Duration>,
    /// Connection timeout.
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Top-level client configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UrlChatConfig {
    /// Backend connection settings.
    pub api: ApiConfig,
    /// Backend flavour.
    pub mode: DeploymentMode,
    /// Override for hiding transport failures of the URL submission.
    ///
    /// `None` keeps the mode's default policy.
    #[serde(default)]
    pub suppress_transport_errors: Option<bool>,
}

impl UrlChatConfig {
    /// Create a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend base address.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    /// Set the deployment mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: DeploymentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.api.request_timeout = Some(timeout);
        self
    }

    /// Force transport errors of the URL submission to be shown or hidden.
    #[must_use]
    pub const fn with_suppress_transport_errors(mut self, suppress: bool) -> Self {
        self.suppress_transport_errors = Some(suppress);
        self
    }

    /// Load the configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            url::Url::parse(&base_url).map_err(|e| ConfigError::InvalidValue {
                key: ENV_BASE_URL,
                value: base_url.clone(),
                reason: e.to_string(),
            })?;
            config.api.base_url = base_url;
        }

        if let Some(mode) = lookup(ENV_MODE) {
            config.mode = mode.parse::<DeploymentMode>().map_err(|reason| ConfigError::InvalidValue {
                key: ENV_MODE,
                value: mode.clone(),
                reason,
            })?;
        }

        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT) {
            let parsed = secs
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: ENV_REQUEST_TIMEOUT,
                    value: secs.clone(),
                    reason: e.to_string(),
                })?;
            config.api.request_timeout = (parsed > 0).then(|| Duration::from_secs(parsed));
        }

        if let Some(flag) = lookup(ENV_SUPPRESS_TRANSPORT) {
            config.suppress_transport_errors =
                Some(parse_bool(&flag).ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_SUPPRESS_TRANSPORT,
                    value: flag.clone(),
                    reason: "expected true/false".to_string(),
                })?);
        }

        Ok(config)
    }
}

/// Port the stub backend listens on.
///
/// # Errors
/// Returns an error if `URLCHAT_STUB_PORT` is not a valid port.
pub fn stub_port() -> Result<u16, ConfigError> {
    match std::env::var(ENV_STUB_PORT) {
        Ok(raw) => raw.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidValue {
                key: ENV_STUB_PORT,
                value: raw.clone(),
                reason: e.to_string(),
            }
        }),
        Err(_) => Ok(DEFAULT_STUB_PORT),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Serde module for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Same as `duration_serde`, for optional timeouts.
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.map(|d| d.as_secs()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
