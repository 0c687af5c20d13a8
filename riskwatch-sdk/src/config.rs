//! Client configuration shared by the notifier and the CLI.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::duration::serde_humanized;

/// Baseline poll interval when nothing else is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Per-request timeout when nothing else is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Deployment the client talks to when no explicit URL is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiEnvironment {
    /// Local backend on port 8000.
    #[default]
    Development,
    /// Hosted production API.
    Production,
}

impl ApiEnvironment {
    /// Base URL of the API for this environment.
    pub fn default_url(self) -> &'static str {
        match self {
            ApiEnvironment::Development => "http://localhost:8000",
            ApiEnvironment::Production => "https://africa-risk-api.onrender.com",
        }
    }
}

/// Connection and cadence settings.
///
/// Deserializes from any serde source; durations accept `"15s"`, `"500ms"`
/// or a bare number of milliseconds.
///
/// ```rust
/// use riskwatch_sdk::{ApiEnvironment, ClientConfig};
/// use std::time::Duration;
///
/// let config: ClientConfig = serde_json::from_str(
///     r#"{"environment":"production","poll_interval":"5s"}"#,
/// ).unwrap();
///
/// assert_eq!(config.base_url(), "https://africa-risk-api.onrender.com");
/// assert_eq!(config.poll_interval, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Explicit base URL; overrides `environment` when set.
    pub api_url: Option<String>,

    /// Which deployment to use when `api_url` is unset.
    pub environment: ApiEnvironment,

    /// Baseline interval between polls.
    #[serde(with = "serde_humanized")]
    pub poll_interval: Duration,

    /// Timeout applied to each HTTP request.
    #[serde(with = "serde_humanized")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            environment: ApiEnvironment::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// The effective base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url
            .as_deref()
            .unwrap_or_else(|| self.environment.default_url())
            .trim_end_matches('/')
    }
}
