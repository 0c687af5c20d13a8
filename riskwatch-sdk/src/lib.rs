//! # riskwatch-sdk
//!
//! Client-side plumbing for model lifecycle notifications from the Africa
//! Risk Intelligence API.
//!
//! The centerpiece is [`ModelEventNotifier`]: a polling client that asks the
//! API for events newer than the last one it delivered and hands each new
//! event to every registered listener, in order, exactly once.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use riskwatch_sdk::{ClientConfig, ModelEventNotifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let notifier = ModelEventNotifier::from_config(&ClientConfig::default())?;
//!
//!     // The first listener starts the poll loop.
//!     let subscription = notifier.add_event_listener(|event| {
//!         println!("{} at {}", event.kind, event.timestamp);
//!     });
//!
//!     tokio::signal::ctrl_c().await?;
//!
//!     // The last listener leaving stops it again.
//!     subscription.unsubscribe();
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **One loop, many listeners**: fan-out happens in-process
//! - **No overlapping requests**: the next poll is scheduled only after the
//!   current one resolves
//! - **Adjustable cadence**: `start_polling(Some(interval))` and `boost()` for
//!   busy windows such as a retraining upload
//! - **Quiet failures**: fetch errors never reach listeners; they show up in
//!   [`NotifierHealth`] and the optional diagnostics hook
//! - **Pluggable transport**: implement [`EventSource`] to poll something
//!   other than the HTTP API

mod config;
mod diagnostics;
mod duration;
mod error;
mod http;
mod notifier;
mod source;
mod state;
mod subscription;

pub use config::{ApiEnvironment, ClientConfig, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
pub use diagnostics::{DiagnosticsHook, NotifierHealth, PollOutcome, PollReport};
pub use duration::{format_duration, parse_duration};
pub use error::{FetchError, NotifierError};
pub use http::{HttpEventSource, HttpEventSourceBuilder};
pub use notifier::{ModelEventNotifier, NotifierBuilder};
pub use source::EventSource;
pub use subscription::Subscription;

// Re-export types for convenience
pub use riskwatch_types::{EventBatch, EventKind, EventTimestamp, ModelEvent, ServiceStatus};
