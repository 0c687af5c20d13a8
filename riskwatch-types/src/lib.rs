//! # riskwatch-types
//!
//! Wire types for the model lifecycle events exposed by the Africa Risk
//! Intelligence API at `GET <base>/model/events`.
//!
//! The notifier in `riskwatch-sdk` only inspects two things about an event:
//! its kind tag and its timestamp. Everything else the server sends is kept
//! verbatim in [`ModelEvent::payload`] and handed to observers untouched.
//!
//! ## Example
//!
//! ```rust
//! use riskwatch_types::{EventBatch, EventKind};
//!
//! let body = r#"{"events":[{"type":"model_updated","timestamp":"2025-01-01T00:00:00Z","version":3}]}"#;
//! let batch: EventBatch = serde_json::from_str(body).unwrap();
//!
//! let event = &batch.events[0];
//! assert_eq!(event.kind, EventKind::ModelUpdated);
//! assert_eq!(event.timestamp.as_str(), "2025-01-01T00:00:00Z");
//! assert_eq!(event.payload["version"], 3);
//! ```

mod batch;
mod event;
mod timestamp;

pub use batch::{EventBatch, ServiceStatus};
pub use event::{EventKind, ModelEvent};
pub use timestamp::EventTimestamp;
