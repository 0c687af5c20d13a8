//! Listener registration handle.

use std::fmt;
use std::sync::Weak;

use crate::notifier::Inner;
use crate::state::ObserverId;

/// Keeps one listener registered with a [`ModelEventNotifier`](crate::ModelEventNotifier).
///
/// This is the "unsubscribe function" of the notifier API: call
/// [`unsubscribe`](Subscription::unsubscribe) or drop the handle to remove
/// exactly this listener. When the last listener goes away the poll loop
/// stops and its pending wake-up is cancelled.
///
/// # Example
///
/// ```rust,no_run
/// # use riskwatch_sdk::ModelEventNotifier;
/// # async fn demo(notifier: ModelEventNotifier) {
/// let subscription = notifier.add_event_listener(|event| {
///     println!("model event: {}", event.kind);
/// });
///
/// // ... later ...
/// subscription.unsubscribe();
/// # }
/// ```
#[must_use = "dropping a Subscription unregisters the listener immediately"]
pub struct Subscription {
    pub(crate) notifier: Weak<Inner>,
    pub(crate) id: Option<ObserverId>,
}

impl Subscription {
    /// Remove the listener. Equivalent to dropping the handle.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Keep the listener registered for as long as the notifier lives.
    pub fn detach(mut self) {
        self.id = None;
    }

    /// Check if this handle still owns a registration.
    pub fn is_registered(&self) -> bool {
        self.id.is_some() && self.notifier.strong_count() > 0
    }

    fn release(&mut self) {
        if let Some(id) = self.id.take() {
            if let Some(inner) = self.notifier.upgrade() {
                inner.remove_observer(id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("registered", &self.is_registered())
            .finish()
    }
}
