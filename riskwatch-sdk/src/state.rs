//! Internal mutable state of a notifier.

use std::sync::Arc;

use riskwatch_types::{EventTimestamp, ModelEvent};
use tokio::task::JoinHandle;

use crate::diagnostics::NotifierHealth;

/// Callback registered through `add_event_listener`.
pub(crate) type Observer = Arc<dyn Fn(&ModelEvent) + Send + Sync>;

/// Identifies one registration, so the same closure registered twice can be
/// removed independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ObserverId(u64);

/// Everything the poll loop and the public API share.
///
/// Guarded by a single mutex that is never held across an await point, while
/// observers run, or while an observer is dropped.
#[derive(Default)]
pub(crate) struct NotifierState {
    /// Registration order is delivery order.
    pub observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
    /// Timestamp of the last delivered event.
    pub watermark: Option<EventTimestamp>,
    /// True exactly while a poll loop is supposed to be running.
    pub active: bool,
    /// The running poll loop; aborting it cancels any pending wake-up.
    pub pending: Option<JoinHandle<()>>,
    /// Bumped on every activation and deactivation. A loop whose generation
    /// no longer matches must not fetch, deliver, or touch the watermark.
    pub generation: u64,
    /// Bumped on every interval change, so a timed revert can tell whether
    /// someone else changed the interval in the meantime.
    pub interval_epoch: u64,
    pub health: NotifierHealth,
}

impl NotifierState {
    pub fn add_observer(&mut self, observer: Observer) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, observer));
        id
    }

    /// Remove a registration and hand it back, so the caller can drop it
    /// after releasing the lock. An observer may own other subscriptions.
    pub fn remove_observer(&mut self, id: ObserverId) -> Option<Observer> {
        let index = self.observers.iter().position(|(existing, _)| *existing == id)?;
        Some(self.observers.remove(index).1)
    }

    /// Copy of the current observers, taken before a delivery pass.
    pub fn snapshot_observers(&self) -> Vec<Observer> {
        self.observers.iter().map(|(_, o)| o.clone()).collect()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.active && self.generation == generation
    }
}
