//! The model event notifier: one poll loop, many in-process observers.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use riskwatch_types::{EventTimestamp, ModelEvent};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::{ClientConfig, DEFAULT_POLL_INTERVAL};
use crate::diagnostics::{DiagnosticsHook, NotifierHealth, PollOutcome, PollReport};
use crate::http::HttpEventSource;
use crate::state::{NotifierState, Observer, ObserverId};
use crate::subscription::Subscription;
use crate::{EventSource, NotifierError};

/// Polls the API for model lifecycle events and fans them out to listeners.
///
/// The notifier runs at most one poll loop, no matter how many listeners are
/// registered. The loop starts when the first listener is added (the first
/// poll fires immediately) and stops when the last one is removed. Each poll
/// asks for events after the watermark, which is the timestamp of the last
/// event delivered, so every event reaches every listener once.
///
/// Cloning is cheap and every clone drives the same loop.
///
/// # Example
///
/// ```rust,no_run
/// use riskwatch_sdk::{HttpEventSource, ModelEventNotifier};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let source = HttpEventSource::builder()
///         .endpoint("http://localhost:8000")
///         .build()?;
///
///     let notifier = ModelEventNotifier::builder()
///         .source(source)
///         .interval(Duration::from_secs(15))
///         .build()?;
///
///     let _subscription = notifier.add_event_listener(|event| {
///         println!("{} at {}", event.kind, event.timestamp);
///     });
///
///     // A retraining job was just submitted: poll faster for a minute.
///     notifier.boost(Duration::from_secs(5), Duration::from_secs(60));
///
///     tokio::time::sleep(Duration::from_secs(120)).await;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct ModelEventNotifier {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    source: Arc<dyn EventSource>,
    baseline: Duration,
    runtime: Handle,
    hook: Option<DiagnosticsHook>,
    state: Mutex<NotifierState>,
    /// Current poll interval. The loop watches it so a change re-arms the
    /// pending wake-up.
    interval: watch::Sender<Duration>,
    /// Held for the whole request/deliver cycle; at most one fetch in flight.
    cycle_lock: tokio::sync::Mutex<()>,
}

impl ModelEventNotifier {
    /// Create a builder for configuring the notifier.
    pub fn builder() -> NotifierBuilder {
        NotifierBuilder::new()
    }

    /// Build a notifier that polls the HTTP API described by `config`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &ClientConfig) -> Result<Self, NotifierError> {
        Self::builder()
            .source(HttpEventSource::from_config(config)?)
            .interval(config.poll_interval)
            .build()
    }

    /// Register a listener.
    ///
    /// Listeners are called synchronously from the poll loop, once per new
    /// event, in registration order. If this is the first listener the loop
    /// starts and polls immediately.
    ///
    /// A panicking listener is logged and skipped; the remaining listeners
    /// still receive the event and the loop keeps running.
    pub fn add_event_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ModelEvent) + Send + Sync + 'static,
    {
        let id = {
            let mut state = self.inner.state.lock();
            let first = state.observers.is_empty();
            let id = state.add_observer(Arc::new(listener));
            if first {
                self.inner.activate_locked(&mut state);
            }
            id
        };

        Subscription {
            notifier: Arc::downgrade(&self.inner),
            id: Some(id),
        }
    }

    /// Start polling, optionally replacing the poll interval.
    ///
    /// Starts the loop even when nobody is listening yet, which lets callers
    /// warm up or speed up polling ahead of time. Calling this while already
    /// polling only changes the interval used for the next wake-up; it never
    /// starts a second loop. A zero interval is ignored.
    pub fn start_polling(&self, interval: Option<Duration>) {
        if let Some(interval) = interval.filter(|i| !i.is_zero()) {
            self.inner.set_interval(interval);
        }
        self.inner.activate();
    }

    /// Stop polling and cancel the pending wake-up.
    ///
    /// Listeners and the watermark are kept; `start_polling` resumes from
    /// where the loop left off.
    pub fn stop_polling(&self) {
        self.inner.deactivate();
    }

    /// Poll at `interval` for `window`, then fall back to the baseline.
    ///
    /// Starts polling if needed, like [`start_polling`](Self::start_polling).
    /// If the interval is changed again before `window` elapses, the later
    /// change wins and no revert happens.
    pub fn boost(&self, interval: Duration, window: Duration) {
        if interval.is_zero() {
            return;
        }

        let epoch = self.inner.set_interval(interval);
        self.inner.activate();

        let notifier = Arc::downgrade(&self.inner);
        self.inner.runtime.spawn(async move {
            tokio::time::sleep(window).await;
            if let Some(inner) = notifier.upgrade() {
                inner.revert_interval(epoch);
            }
        });
    }

    /// Go back to the baseline interval immediately.
    pub fn reset_interval(&self) {
        self.inner.set_interval(self.inner.baseline);
    }

    /// Whether the poll loop is running.
    pub fn is_active(&self) -> bool {
        self.inner.state.lock().active
    }

    /// Timestamp of the last delivered event, if any.
    pub fn watermark(&self) -> Option<EventTimestamp> {
        self.inner.state.lock().watermark.clone()
    }

    /// Current poll interval.
    pub fn interval(&self) -> Duration {
        *self.inner.interval.borrow()
    }

    /// Interval the notifier reverts to after a boost.
    pub fn baseline_interval(&self) -> Duration {
        self.inner.baseline
    }

    /// Number of registered listeners.
    pub fn observer_count(&self) -> usize {
        self.inner.state.lock().observers.len()
    }

    /// Connectivity counters.
    pub fn health(&self) -> NotifierHealth {
        self.inner.state.lock().health.clone()
    }

    /// Description of the underlying event source.
    pub fn source_description(&self) -> &str {
        self.inner.source.description()
    }
}

impl fmt::Debug for ModelEventNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ModelEventNotifier")
            .field("source", &self.inner.source.description())
            .field("active", &state.active)
            .field("observers", &state.observers.len())
            .field("watermark", &state.watermark)
            .field("interval", &*self.inner.interval.borrow())
            .finish()
    }
}

impl Inner {
    fn activate(self: &Arc<Self>) {
        let mut state = self.state.lock();
        self.activate_locked(&mut state);
    }

    /// Start the loop unless one is running. The caller holds the state lock,
    /// so the check and the transition cannot be split by another thread.
    fn activate_locked(self: &Arc<Self>, state: &mut NotifierState) {
        if state.active {
            return;
        }

        state.active = true;
        state.generation += 1;
        let generation = state.generation;

        let handle = self
            .runtime
            .spawn(run_loop(Arc::downgrade(self), generation));
        if let Some(stale) = state.pending.replace(handle) {
            stale.abort();
        }

        info!(
            source = self.source.description(),
            interval_ms = self.interval.borrow().as_millis() as u64,
            "model event polling started"
        );
    }

    fn deactivate(&self) {
        let pending = self.deactivate_locked(&mut self.state.lock());
        if let Some(handle) = pending {
            handle.abort();
        }
    }

    /// Mark the loop stopped and hand back its task for the caller to abort
    /// once the lock is released.
    fn deactivate_locked(&self, state: &mut NotifierState) -> Option<JoinHandle<()>> {
        if !state.active {
            return None;
        }
        state.active = false;
        state.generation += 1;
        info!(source = self.source.description(), "model event polling stopped");
        state.pending.take()
    }

    pub(crate) fn remove_observer(&self, id: ObserverId) {
        let (removed, pending) = {
            let mut state = self.state.lock();
            let removed = state.remove_observer(id);
            let pending = if removed.is_some() && state.observers.is_empty() {
                self.deactivate_locked(&mut state)
            } else {
                None
            };
            (removed, pending)
        };

        if let Some(handle) = pending {
            handle.abort();
        }
        drop(removed);
    }

    /// Returns the epoch identifying this change.
    fn set_interval(&self, interval: Duration) -> u64 {
        let mut state = self.state.lock();
        state.interval_epoch += 1;
        self.interval.send_replace(interval);
        debug!(interval_ms = interval.as_millis() as u64, "poll interval changed");
        state.interval_epoch
    }

    fn revert_interval(&self, epoch: u64) {
        let unchanged = self.state.lock().interval_epoch == epoch;
        if unchanged {
            self.set_interval(self.baseline);
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.lock().is_current(generation)
    }

    /// One request/deliver cycle.
    async fn poll_once(&self, generation: u64) {
        let _cycle = self.cycle_lock.lock().await;

        let since = {
            let state = self.state.lock();
            if !state.is_current(generation) {
                return;
            }
            state.watermark.clone()
        };

        debug!(
            source = self.source.description(),
            since = since.as_ref().map(EventTimestamp::as_str),
            "polling for model events"
        );

        let result = self.source.fetch_events(since.as_ref()).await;

        let outcome = match result {
            Ok(events) if events.is_empty() => PollOutcome::Empty,
            Ok(events) => {
                let Some(observers) = self.advance_watermark(generation, &events) else {
                    return;
                };
                let observer_panics = deliver(&events, &observers);
                info!(count = events.len(), "processed model events");
                PollOutcome::Delivered {
                    events: events.len(),
                    observer_panics,
                }
            }
            Err(err) => {
                warn!(error = %err, "error polling for model events");
                PollOutcome::Failed(err)
            }
        };

        let report = {
            let mut state = self.state.lock();
            if !matches!(outcome, PollOutcome::Delivered { .. }) && !state.is_current(generation) {
                return;
            }
            state.health.record(&outcome);
            PollReport {
                cycle: state.health.cycles,
                outcome,
                watermark: state.watermark.clone(),
            }
        };

        if let Some(hook) = &self.hook {
            if panic::catch_unwind(AssertUnwindSafe(|| hook(&report))).is_err() {
                error!("diagnostics hook panicked");
            }
        }
    }

    /// Move the watermark to the last event and snapshot the observers, in
    /// one critical section. Returns `None` if this loop has been stopped.
    fn advance_watermark(&self, generation: u64, events: &[ModelEvent]) -> Option<Vec<Observer>> {
        let mut state = self.state.lock();
        if !state.is_current(generation) {
            return None;
        }

        if let Some(last) = events.last() {
            if let Some(previous) = &state.watermark {
                if last.timestamp < *previous {
                    warn!(
                        previous = previous.as_str(),
                        received = last.timestamp.as_str(),
                        "server returned events older than the watermark"
                    );
                }
            }
            state.watermark = Some(last.timestamp.clone());
        }

        Some(state.snapshot_observers())
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.state.get_mut().pending.take() {
            handle.abort();
        }
    }
}

/// Hand every event to every observer, in order. Returns the number of
/// observer calls that panicked.
fn deliver(events: &[ModelEvent], observers: &[Observer]) -> usize {
    let mut panics = 0;
    for event in events {
        for observer in observers {
            if panic::catch_unwind(AssertUnwindSafe(|| observer(event))).is_err() {
                panics += 1;
                error!(
                    kind = event.kind.as_str(),
                    timestamp = event.timestamp.as_str(),
                    "model event listener panicked"
                );
            }
        }
    }
    panics
}

/// The poll loop. Holds only a weak reference so dropping every notifier
/// handle ends it.
async fn run_loop(notifier: Weak<Inner>, generation: u64) {
    let mut interval_rx = match notifier.upgrade() {
        Some(inner) => inner.interval.subscribe(),
        None => return,
    };

    loop {
        {
            let Some(inner) = notifier.upgrade() else {
                return;
            };
            inner.poll_once(generation).await;
            if !inner.is_current(generation) {
                return;
            }
        }

        let cycle_end = Instant::now();
        let mut deadline = cycle_end + *interval_rx.borrow_and_update();
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => break,
                changed = interval_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    deadline = cycle_end + *interval_rx.borrow_and_update();
                }
            }
        }
    }
}

/// Builder for configuring a ModelEventNotifier.
#[derive(Default)]
pub struct NotifierBuilder {
    source: Option<Arc<dyn EventSource>>,
    interval: Option<Duration>,
    hook: Option<DiagnosticsHook>,
    runtime: Option<Handle>,
}

impl NotifierBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set where events come from.
    pub fn source(mut self, source: impl EventSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Set the baseline poll interval.
    ///
    /// Defaults to 15 seconds if not specified.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Install a hook that sees the outcome of every poll cycle.
    pub fn diagnostics<F>(mut self, hook: F) -> Self
    where
        F: Fn(&PollReport) + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Run the poll loop on this runtime instead of the current one.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Build the notifier. It stays idle until a listener is added or
    /// polling is started explicitly.
    pub fn build(self) -> Result<ModelEventNotifier, NotifierError> {
        let source = self.source.ok_or(NotifierError::NoSource)?;
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| NotifierError::NoRuntime)?,
        };
        let baseline = self
            .interval
            .filter(|i| !i.is_zero())
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        let (interval, _) = watch::channel(baseline);

        Ok(ModelEventNotifier {
            inner: Arc::new(Inner {
                source,
                baseline,
                runtime,
                hook: self.hook,
                state: Mutex::new(NotifierState::default()),
                interval,
                cycle_lock: tokio::sync::Mutex::new(()),
            }),
        })
    }
}

impl fmt::Debug for NotifierBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierBuilder")
            .field("source", &self.source.as_ref().map(|s| s.description()))
            .field("interval", &self.interval)
            .field("diagnostics", &self.hook.is_some())
            .finish()
    }
}
