//! HTTP event source backed by the API's `/model/events` endpoint.
//!
//! ## Example
//!
//! ```rust,no_run
//! use riskwatch_sdk::{EventSource, HttpEventSource};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpEventSource::builder()
//!         .endpoint("http://localhost:8000")
//!         .timeout(Duration::from_secs(10))
//!         .build()?;
//!
//!     for event in source.fetch_events(None).await? {
//!         println!("{} at {}", event.kind, event.timestamp);
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use riskwatch_types::{EventBatch, EventTimestamp, ModelEvent, ServiceStatus};

use crate::config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT};
use crate::{EventSource, FetchError, NotifierError};

const EVENTS_PATH: &str = "/model/events";
const STATUS_PATH: &str = "/api/status";

/// Event source that polls the API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: Client,
    endpoint: String,
    description: String,
}

impl HttpEventSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpEventSourceBuilder {
        HttpEventSourceBuilder::default()
    }

    /// Build a source from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, NotifierError> {
        Self::builder()
            .endpoint(config.base_url())
            .timeout(config.request_timeout)
            .build()
    }

    /// Base URL this source talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query the API's health endpoint.
    pub async fn status(&self) -> Result<ServiceStatus, FetchError> {
        let url = format!("{}{}", self.endpoint, STATUS_PATH);
        let response = self.client.get(&url).send().await?;
        Self::check_status(response.status())?;

        response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }

    fn check_status(status: StatusCode) -> Result<(), FetchError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(FetchError::Http(format!("API returned status {}", status)))
        }
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn fetch_events(
        &self,
        since: Option<&EventTimestamp>,
    ) -> Result<Vec<ModelEvent>, FetchError> {
        let url = format!("{}{}", self.endpoint, EVENTS_PATH);

        let mut request = self.client.get(&url);
        if let Some(since) = since {
            request = request.query(&[("since", since.as_str())]);
        }

        let response = request.send().await?;
        Self::check_status(response.status())?;

        // Read the body first so a timeout while streaming it stays a timeout.
        let body = response.bytes().await?;
        let batch: EventBatch =
            serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(batch.events)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for HttpEventSource.
#[derive(Debug, Default)]
pub struct HttpEventSourceBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpEventSourceBuilder {
    /// Set the API base URL (e.g., "http://localhost:8000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> Result<HttpEventSource, NotifierError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifierError::Client(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| ClientConfig::default().base_url().to_string())
            .trim_end_matches('/')
            .to_string();
        let description = format!("http: {}{}", endpoint, EVENTS_PATH);

        Ok(HttpEventSource {
            client,
            endpoint,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiEnvironment;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            let request = String::from_utf8_lossy(&buf).to_string();
            request.lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{}", addr), handle)
    }

    /// Accept one connection, read the request, write `head` (if any), then
    /// hold the socket open without finishing the response.
    async fn serve_stalled(head: Option<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut chunk = [0u8; 1024];
            let _ = socket.read(&mut chunk).await;
            if let Some(head) = head {
                socket.write_all(head.as_bytes()).await.unwrap();
            }
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_builder_defaults() {
        let source = HttpEventSource::builder().build().unwrap();
        assert_eq!(source.endpoint(), "http://localhost:8000");
        assert_eq!(source.description(), "http: http://localhost:8000/model/events");
    }

    #[test]
    fn test_builder_strips_trailing_slash() {
        let source = HttpEventSource::builder()
            .endpoint("https://risk.example.org/")
            .build()
            .unwrap();
        assert_eq!(source.endpoint(), "https://risk.example.org");
    }

    #[test]
    fn test_from_config_uses_environment() {
        let config = ClientConfig {
            environment: ApiEnvironment::Production,
            ..Default::default()
        };
        let source = HttpEventSource::from_config(&config).unwrap();
        assert_eq!(source.endpoint(), "https://africa-risk-api.onrender.com");
    }

    #[tokio::test]
    async fn first_fetch_has_no_since_parameter() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"events":[{"type":"model_updated","timestamp":"2025-01-01T00:00:00Z"}]}"#,
        )
        .await;
        let source = HttpEventSource::builder().endpoint(url).build().unwrap();

        let events = source.fetch_events(None).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timestamp.as_str(), "2025-01-01T00:00:00Z");
        assert_eq!(server.await.unwrap(), "GET /model/events HTTP/1.1");
    }

    #[tokio::test]
    async fn since_parameter_is_url_encoded() {
        let (url, server) = serve_once("200 OK", r#"{"events":[]}"#).await;
        let source = HttpEventSource::builder().endpoint(url).build().unwrap();

        let since = EventTimestamp::from("2025-01-01T00:00:00+01:00");
        let events = source.fetch_events(Some(&since)).await.unwrap();

        assert!(events.is_empty());
        assert_eq!(
            server.await.unwrap(),
            "GET /model/events?since=2025-01-01T00%3A00%3A00%2B01%3A00 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let (url, _server) = serve_once("503 Service Unavailable", "{}").await;
        let source = HttpEventSource::builder().endpoint(url).build().unwrap();

        let err = source.fetch_events(None).await.unwrap_err();
        assert!(matches!(err, FetchError::Http(msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let (url, _server) = serve_once("200 OK", r#"{"status":"ok"}"#).await;
        let source = HttpEventSource::builder().endpoint(url).build().unwrap();

        let err = source.fetch_events(None).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_connection_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpEventSource::builder()
            .endpoint(format!("http://{}", addr))
            .build()
            .unwrap();

        let err = source.fetch_events(None).await.unwrap_err();
        assert!(matches!(err, FetchError::Connection(_)));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let url = serve_stalled(None).await;
        let source = HttpEventSource::builder()
            .endpoint(url)
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        let err = source.fetch_events(None).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }

    #[tokio::test]
    async fn stalled_body_times_out() {
        let url = serve_stalled(Some(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 64\r\n\r\n{\"events\":[",
        ))
        .await;
        let source = HttpEventSource::builder()
            .endpoint(url)
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        let err = source.fetch_events(None).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }

    #[tokio::test]
    async fn status_returns_body() {
        let (url, server) = serve_once("200 OK", r#"{"status":"online"}"#).await;
        let source = HttpEventSource::builder().endpoint(url).build().unwrap();

        let status = source.status().await.unwrap();
        assert_eq!(status.get("status").and_then(|v| v.as_str()), Some("online"));
        assert_eq!(server.await.unwrap(), "GET /api/status HTTP/1.1");
    }
}
