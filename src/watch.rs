//! The `watch` and `status` commands.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use riskwatch_sdk::{
    format_duration, ClientConfig, HttpEventSource, ModelEvent, ModelEventNotifier, PollOutcome,
    PollReport,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::render::{render_event, OutputFormat};

/// Options for one `watch` run.
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    pub format: OutputFormat,
    /// Faster interval and how long to keep it.
    pub boost: Option<(Duration, Duration)>,
    /// Stop after this many events.
    pub count: Option<usize>,
}

/// Change in connectivity worth telling the user about.
#[derive(Debug, Clone, PartialEq)]
pub enum Connectivity {
    Lost(String),
    Restored,
}

/// Turns the per-cycle diagnostics stream into lost/restored transitions,
/// so a flaky connection logs once instead of on every tick.
#[derive(Debug)]
pub struct ConnectivityTracker {
    healthy: AtomicBool,
}

impl Default for ConnectivityTracker {
    fn default() -> Self {
        Self {
            healthy: AtomicBool::new(true),
        }
    }
}

impl ConnectivityTracker {
    pub fn observe(&self, report: &PollReport) -> Option<Connectivity> {
        match &report.outcome {
            PollOutcome::Failed(err) => self
                .healthy
                .swap(false, Ordering::SeqCst)
                .then(|| Connectivity::Lost(err.to_string())),
            PollOutcome::Delivered { .. } | PollOutcome::Empty => {
                (!self.healthy.swap(true, Ordering::SeqCst)).then_some(Connectivity::Restored)
            }
        }
    }
}

/// Poll until interrupted (or `count` events were printed).
pub async fn run_watch(config: &ClientConfig, options: WatchOptions) -> Result<()> {
    let source = HttpEventSource::from_config(config)?;
    let tracker = Arc::new(ConnectivityTracker::default());
    let hook_tracker = tracker.clone();

    let notifier = ModelEventNotifier::builder()
        .source(source)
        .interval(config.poll_interval)
        .diagnostics(move |report| match hook_tracker.observe(report) {
            Some(Connectivity::Lost(reason)) => warn!(%reason, "lost connection to API"),
            Some(Connectivity::Restored) => info!("connection to API restored"),
            None => {}
        })
        .build()?;

    let (tx, rx) = mpsc::unbounded_channel::<ModelEvent>();
    let subscription = notifier.add_event_listener(forward_to(tx));

    info!(
        source = notifier.source_description(),
        interval = %format_duration(notifier.interval()),
        "watching for model events"
    );

    if let Some((interval, window)) = options.boost {
        info!(
            interval = %format_duration(interval),
            window = %format_duration(window),
            "boosting poll rate"
        );
        notifier.boost(interval, window);
    }

    let printed = print_events(rx, options.format, options.count, tokio::signal::ctrl_c()).await;

    subscription.unsubscribe();
    info!(events = printed, "stopped watching");
    Ok(())
}

/// Listener that hands events to the printing task. Events arriving after
/// the printer has shut down are dropped.
fn forward_to(tx: mpsc::UnboundedSender<ModelEvent>) -> impl Fn(&ModelEvent) + Send + Sync {
    move |event: &ModelEvent| {
        if tx.send(event.clone()).is_err() {
            debug!(
                timestamp = event.timestamp.as_str(),
                "output closed, dropping model event"
            );
        }
    }
}

/// Print events from `rx` until `shutdown` resolves, the channel closes, or
/// `limit` events were printed. Returns the number printed.
async fn print_events<F>(
    mut rx: mpsc::UnboundedReceiver<ModelEvent>,
    format: OutputFormat,
    limit: Option<usize>,
    shutdown: F,
) -> usize
where
    F: std::future::Future,
{
    let mut printed = 0;
    if limit == Some(0) {
        return printed;
    }

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                println!("{}", render_event(&event, format));
                printed += 1;
                if Some(printed) == limit {
                    break;
                }
            }
            _ = &mut shutdown => break,
        }
    }
    printed
}

/// Query `/api/status` once and print the response.
pub async fn run_status(config: &ClientConfig) -> Result<()> {
    let source = HttpEventSource::from_config(config)?;
    let status = source
        .status()
        .await
        .with_context(|| format!("API at {} is not reachable", source.endpoint()))?;

    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
