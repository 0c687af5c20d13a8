//! # riskwatch
//!
//! Command-line companion to the Africa Risk Intelligence dashboard. It
//! watches the API for model lifecycle events (for example, "model
//! retrained") and prints them as they arrive.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          riskwatch                           │
//! │  ┌──────────┐   ┌──────────┐   ┌───────────────────────────┐ │
//! │  │   cli    │──▶│ settings │──▶│ watch / status            │ │
//! │  │  (clap)  │   │ (config) │   │  ModelEventNotifier ─┐    │ │
//! │  └──────────┘   └──────────┘   │  listener ◀──────────┘    │ │
//! │                                │     │                     │ │
//! │                                │     ▼                     │ │
//! │                                │  render ──▶ stdout        │ │
//! │                                └───────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//!                 │  GET /model/events?since=<watermark>
//!                 ▼
//!          Africa Risk Intelligence API
//! ```
//!
//! - **[`cli`]**: Argument parsing
//! - **[`settings`]**: Defaults, TOML file, `RISKWATCH_*` environment and flag overrides
//! - **[`watch`]**: Runs the notifier and prints events; one-shot status check
//! - **[`render`]**: Human and JSON-lines event formatting
//! - **[`logging`]**: `tracing` subscriber setup
//!
//! ## Usage
//!
//! ```bash
//! # Watch the local backend
//! riskwatch watch
//!
//! # Watch production, polling every 5s for the first two minutes
//! riskwatch --env production watch --boost 5s --boost-for 2m
//!
//! # Is the API up?
//! riskwatch status
//! ```

pub mod cli;
pub mod logging;
pub mod render;
pub mod settings;
pub mod watch;

pub use render::{render_event, OutputFormat};
pub use settings::{Overrides, Settings};
pub use watch::{run_status, run_watch, WatchOptions};
