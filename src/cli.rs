//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use riskwatch_sdk::{parse_duration, ApiEnvironment};

use crate::settings::Overrides;

#[derive(Parser, Debug)]
#[command(name = "riskwatch")]
#[command(about = "Watch model lifecycle events from the Africa Risk Intelligence API")]
pub struct Args {
    /// Settings file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL (overrides --env)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Deployment to talk to: "development" or "production"
    #[arg(long, global = true, value_parser = parse_environment)]
    pub env: Option<ApiEnvironment>,

    /// Per-request timeout (e.g., "10s", "500ms")
    #[arg(long, global = true, value_parser = parse_duration_arg)]
    pub timeout: Option<Duration>,

    /// Log filter (e.g., "info", "riskwatch_sdk=debug"); RUST_LOG wins when set
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Poll for model events and print each one as it arrives
    Watch {
        /// Poll interval (e.g., "15s")
        #[arg(short, long, value_parser = parse_duration_arg)]
        interval: Option<Duration>,

        /// Poll at this faster interval for a while after starting
        #[arg(long, value_parser = parse_duration_arg, requires = "boost_for")]
        boost: Option<Duration>,

        /// How long the boost lasts before reverting to the normal interval
        #[arg(long, value_parser = parse_duration_arg, requires = "boost")]
        boost_for: Option<Duration>,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,

        /// Exit after this many events
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Check whether the API is reachable
    Status,
}

impl Args {
    /// Command-line values that override file and environment settings.
    pub fn overrides(&self) -> Overrides {
        let poll_interval = match &self.command {
            Command::Watch { interval, .. } => *interval,
            Command::Status => None,
        };
        Overrides {
            api_url: self.api_url.clone(),
            environment: self.env,
            poll_interval,
            request_timeout: self.timeout,
        }
    }
}

fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    match parse_duration(s) {
        Ok(d) if !d.is_zero() => Ok(d),
        Ok(_) => Err("duration must be greater than zero".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_environment(s: &str) -> Result<ApiEnvironment, String> {
    match s.to_ascii_lowercase().as_str() {
        "development" | "dev" => Ok(ApiEnvironment::Development),
        "production" | "prod" => Ok(ApiEnvironment::Production),
        other => Err(format!(
            "unknown environment '{}' (expected development or production)",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_with_defaults() {
        let args = Args::try_parse_from(["riskwatch", "watch"]).unwrap();
        assert_eq!(
            args.command,
            Command::Watch {
                interval: None,
                boost: None,
                boost_for: None,
                json: false,
                count: None,
            }
        );
        assert!(args.overrides().poll_interval.is_none());
    }

    #[test]
    fn watch_with_boost_and_globals_after_subcommand() {
        let args = Args::try_parse_from([
            "riskwatch", "watch", "--interval", "30s", "--boost", "5s", "--boost-for", "2m",
            "--env", "prod", "--json", "-n", "3",
        ])
        .unwrap();

        assert_eq!(args.env, Some(ApiEnvironment::Production));
        let overrides = args.overrides();
        assert_eq!(overrides.poll_interval, Some(Duration::from_secs(30)));
        assert_eq!(
            args.command,
            Command::Watch {
                interval: Some(Duration::from_secs(30)),
                boost: Some(Duration::from_secs(5)),
                boost_for: Some(Duration::from_secs(120)),
                json: true,
                count: Some(3),
            }
        );
    }

    #[test]
    fn boost_requires_window() {
        assert!(Args::try_parse_from(["riskwatch", "watch", "--boost", "5s"]).is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(Args::try_parse_from(["riskwatch", "watch", "--interval", "0s"]).is_err());
    }

    #[test]
    fn status_takes_timeout() {
        let args =
            Args::try_parse_from(["riskwatch", "--timeout", "3s", "status", "--api-url", "http://x"])
                .unwrap();
        assert_eq!(args.command, Command::Status);
        assert_eq!(args.timeout, Some(Duration::from_secs(3)));
        assert_eq!(args.api_url.as_deref(), Some("http://x"));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!(Args::try_parse_from(["riskwatch", "--env", "staging", "status"]).is_err());
    }
}
