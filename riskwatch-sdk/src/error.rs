//! Error types for the notifier and its event sources.

use thiserror::Error;

/// Errors that can occur while fetching events from the API.
///
/// None of these ever reach observers. The poll loop logs them, records them
/// in [`NotifierHealth`](crate::NotifierHealth), and tries again on the next
/// tick with the same watermark.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The response body was not a valid event batch.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Could not reach the server.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The configured endpoint is not a usable URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else if err.is_builder() {
            FetchError::InvalidEndpoint(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

/// Errors raised while constructing a notifier or source.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// No event source was configured.
    #[error("No event source configured")]
    NoSource,

    /// `build()` was called outside a tokio runtime and no handle was given.
    #[error("No tokio runtime available; call from within a runtime or pass a handle")]
    NoRuntime,

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    /// A duration string could not be parsed.
    #[error("Invalid duration '{0}'")]
    InvalidDuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        assert_eq!(FetchError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            FetchError::Http("API returned status 503".into()).to_string(),
            "HTTP request failed: API returned status 503"
        );
        assert_eq!(
            NotifierError::InvalidDuration("5 minutes".into()).to_string(),
            "Invalid duration '5 minutes'"
        );
    }
}
