//! Event source abstraction.
//!
//! The notifier never talks to the network directly. It asks an
//! [`EventSource`] for the events after a watermark, which lets tests script
//! responses and lets callers swap transports.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use riskwatch_types::{EventTimestamp, ModelEvent};

use crate::FetchError;

/// Trait for fetching model lifecycle events.
///
/// # Contract
///
/// - With `since = None`, return every event the server currently knows.
/// - With `since = Some(ts)`, return only events strictly after `ts`.
/// - Events come back in ascending timestamp order; the notifier does not
///   re-sort them.
/// - Implementations should bound each call with a timeout and report it as
///   [`FetchError::Timeout`].
#[async_trait]
pub trait EventSource: Send + Sync + Debug {
    /// Fetch events newer than `since`.
    async fn fetch_events(
        &self,
        since: Option<&EventTimestamp>,
    ) -> Result<Vec<ModelEvent>, FetchError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used in log lines.
    fn description(&self) -> &str;
}

#[async_trait]
impl<S: EventSource + ?Sized> EventSource for Arc<S> {
    async fn fetch_events(
        &self,
        since: Option<&EventTimestamp>,
    ) -> Result<Vec<ModelEvent>, FetchError> {
        (**self).fetch_events(since).await
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}
