//! Response bodies of the events and status endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{EventTimestamp, ModelEvent};

/// Body of `GET <base>/model/events`.
///
/// `events` is required. A body without it is malformed and must not be
/// mistaken for "no new events".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventBatch {
    /// Events in ascending timestamp order, as sent by the server.
    pub events: Vec<ModelEvent>,
}

impl EventBatch {
    /// Create a batch from a list of events.
    pub fn new(events: Vec<ModelEvent>) -> Self {
        Self { events }
    }

    /// Number of events in the batch.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the batch carries no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the last event, which becomes the next watermark.
    pub fn last_timestamp(&self) -> Option<&EventTimestamp> {
        self.events.last().map(|e| &e.timestamp)
    }
}

/// Body of `GET <base>/api/status`, kept as an opaque JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceStatus(pub Map<String, Value>);

impl ServiceStatus {
    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}
