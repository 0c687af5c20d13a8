//! Layered settings: defaults, optional TOML file, `RISKWATCH_*` environment,
//! then command-line overrides.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use riskwatch_sdk::{ApiEnvironment, ClientConfig};

/// Prefix for environment variable overrides, e.g. `RISKWATCH_API_URL`.
pub const ENV_PREFIX: &str = "RISKWATCH";

/// Settings resolved for one CLI run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub client: ClientConfig,
    /// `tracing` filter directive from the file or environment, if any.
    pub log_level: Option<String>,
}

/// Values given on the command line. `None` leaves the layered value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub environment: Option<ApiEnvironment>,
    pub poll_interval: Option<Duration>,
    pub request_timeout: Option<Duration>,
}

impl Settings {
    /// Load settings from an optional file plus the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load settings with an explicit environment source.
    pub fn load_with(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(env)
            .build()
            .context("failed to read settings")?;

        let log_level = config.get_string("log_level").ok();
        let client: ClientConfig = config
            .try_deserialize()
            .context("invalid client settings")?;

        Ok(Self { client, log_level })
    }

    /// Apply command-line values on top of the loaded settings.
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.api_url {
            self.client.api_url = Some(url);
        }
        if let Some(environment) = overrides.environment {
            self.client.environment = environment;
        }
        if let Some(interval) = overrides.poll_interval.filter(|d| !d.is_zero()) {
            self.client.poll_interval = interval;
        }
        if let Some(timeout) = overrides.request_timeout.filter(|d| !d.is_zero()) {
            self.client.request_timeout = timeout;
        }
        self
    }
}
