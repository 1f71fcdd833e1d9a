//! The resource contract and its close notification.

use crate::kind::ResourceKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One-shot close notification carried by a resource.
///
/// The resource fires it exactly once when it closes; at most one subscriber
/// (the registry) observes it. A subscription installed after the signal has
/// fired runs immediately, so a registry never waits on a resource that is
/// already gone.
pub struct ClosedSignal {
    fired: AtomicBool,
    subscriber: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl ClosedSignal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
            subscriber: Mutex::new(None),
        }
    }

    /// Installs the close callback, replacing any previous one. Runs the
    /// callback at once if the signal has already fired.
    pub fn subscribe(&self, callback: Box<dyn FnOnce() + Send>) {
        if self.fired.load(Ordering::SeqCst) {
            callback();
            return;
        }
        let mut slot = self.subscriber.lock().expect("closed signal lock poisoned");
        // Fired between the check and the lock: deliver now.
        if self.fired.load(Ordering::SeqCst) {
            drop(slot);
            callback();
            return;
        }
        *slot = Some(callback);
    }

    /// Fires the signal. Only the first call delivers; later calls are no-ops.
    pub fn fire(&self) {
        if self.fired.swap(true, Ordering::SeqCst) {
            return;
        }
        let callback = self
            .subscriber
            .lock()
            .expect("closed signal lock poisoned")
            .take();
        if let Some(callback) = callback {
            callback();
        }
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Default for ClosedSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// A live resource surface (a window or view host) managed by the registry.
///
/// `is_closed` must report `true` no later than the resource's
/// [`ClosedSignal`] fires. A resource may also close silently without firing
/// its signal; the registry treats such an instance as stale on the next
/// lookup.
pub trait Resource: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Makes a freshly built resource visible.
    fn show(&self);

    /// Brings an already visible resource to the foreground.
    fn activate(&self);

    /// Asks the resource to close itself.
    fn request_close(&self);

    fn is_closed(&self) -> bool;

    fn closed_signal(&self) -> &ClosedSignal;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    #[test]
    fn subscribe_then_fire_delivers_once() {
        let signal = ClosedSignal::new();
        let hits = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&hits);
        signal.subscribe(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        signal.fire();
        signal.fire();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(signal.has_fired());
    }

    #[test]
    fn subscribe_after_fire_runs_immediately() {
        let signal = ClosedSignal::new();
        signal.fire();

        let hits = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&hits);
        signal.subscribe(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribed_fire_is_silent() {
        let signal = ClosedSignal::new();
        signal.fire();
        assert!(signal.has_fired());
    }
}
