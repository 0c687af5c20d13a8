//! Model lifecycle events.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::EventTimestamp;

/// Kind tag of a lifecycle event (the `type` field on the wire).
///
/// Tags this crate does not know about are preserved in [`EventKind::Other`]
/// rather than rejected, so newer servers can add event types without
/// breaking older clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// The risk model finished retraining and a new version is live.
    ModelUpdated,
    /// Any other tag, kept verbatim.
    Other(String),
}

impl EventKind {
    /// The wire tag for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::ModelUpdated => "model_updated",
            EventKind::Other(tag) => tag,
        }
    }
}

impl From<String> for EventKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "model_updated" => EventKind::ModelUpdated,
            _ => EventKind::Other(tag),
        }
    }
}

impl From<&str> for EventKind {
    fn from(tag: &str) -> Self {
        EventKind::from(tag.to_string())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::ModelUpdated => "model_updated".to_string(),
            EventKind::Other(tag) => tag,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lifecycle notification from the API.
///
/// # Example
///
/// ```rust
/// use riskwatch_types::{EventKind, ModelEvent};
/// use serde_json::json;
///
/// let event = ModelEvent::new(EventKind::ModelUpdated, "2025-01-01T00:00:00Z")
///     .with_field("accuracy", json!(0.91));
///
/// let wire = serde_json::to_value(&event).unwrap();
/// assert_eq!(wire["type"], "model_updated");
/// assert_eq!(wire["accuracy"], 0.91);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvent {
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Server-assigned ordering key.
    pub timestamp: EventTimestamp,

    /// Every other field of the event object, passed through verbatim.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ModelEvent {
    /// Create an event with an empty payload.
    pub fn new(kind: impl Into<EventKind>, timestamp: impl Into<EventTimestamp>) -> Self {
        Self {
            kind: kind.into(),
            timestamp: timestamp.into(),
            payload: Map::new(),
        }
    }

    /// Add a payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Look up a payload field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_kind_passes_through() {
        let event: ModelEvent = serde_json::from_value(json!({
            "type": "drift_detected",
            "timestamp": "2025-02-01T10:00:00Z",
        }))
        .unwrap();

        assert_eq!(event.kind, EventKind::Other("drift_detected".to_string()));
        assert_eq!(serde_json::to_value(&event).unwrap()["type"], "drift_detected");
    }

    #[test]
    fn payload_round_trips_verbatim() {
        let wire = json!({
            "type": "model_updated",
            "timestamp": "2025-02-01T10:00:00Z",
            "metrics": {"f1": 0.82, "rows": 14000},
            "source": "retrain.csv",
        });

        let event: ModelEvent = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(event.kind, EventKind::ModelUpdated);
        assert_eq!(event.payload.len(), 2);
        assert_eq!(event.field("source"), Some(&json!("retrain.csv")));
        assert_eq!(serde_json::to_value(&event).unwrap(), wire);
    }

    #[test]
    fn missing_timestamp_is_rejected() {
        let result = serde_json::from_value::<ModelEvent>(json!({"type": "model_updated"}));
        assert!(result.is_err());
    }

    #[test]
    fn kind_display_uses_wire_tag() {
        assert_eq!(EventKind::ModelUpdated.to_string(), "model_updated");
        assert_eq!(EventKind::from("custom").as_str(), "custom");
    }
}
