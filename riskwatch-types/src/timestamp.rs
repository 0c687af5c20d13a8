//! Opaque server-assigned ordering key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned ordering key of a [`ModelEvent`](crate::ModelEvent).
///
/// The value is kept exactly as received (usually an ISO-8601 string) so it
/// can be echoed back in the `since` query parameter. Ordering compares the
/// raw strings, which matches chronological order for the fixed-width UTC
/// timestamps the API emits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTimestamp(String);

impl EventTimestamp {
    /// Wrap a raw timestamp string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw value as sent by the server.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the timestamp, returning the raw value.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EventTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventTimestamp {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for EventTimestamp {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_iso_timestamps_chronologically() {
        let earlier = EventTimestamp::from("2025-01-01T00:00:00Z");
        let later = EventTimestamp::from("2025-01-01T00:00:01Z");
        assert!(earlier < later);
        assert_eq!(earlier.max(later.clone()), later);
    }

    #[test]
    fn serializes_as_bare_string() {
        let ts = EventTimestamp::from("2025-03-04T05:06:07Z");
        assert_eq!(
            serde_json::to_string(&ts).unwrap(),
            "\"2025-03-04T05:06:07Z\""
        );
    }

    #[test]
    fn display_is_raw_value() {
        let ts = EventTimestamp::new(String::from("1700000000"));
        assert_eq!(ts.to_string(), "1700000000");
        assert_eq!(ts.into_inner(), "1700000000");
    }
}
