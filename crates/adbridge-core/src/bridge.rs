//! Result bridging between partner callbacks and the mediation contract.
//!
//! The partner SDK reports results through delegate-style callbacks that a
//! well-behaved SDK may still deliver more than once. The mediation side
//! expects exactly one result per operation. [`CompletionSlot`] is the
//! bridge: a write-once-then-cleared holder that is swapped out atomically
//! when fired.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

use crate::error::AdapterError;

/// Key-value payload attached to results and lifecycle events.
pub type AdDetails = serde_json::Map<String, serde_json::Value>;

/// The one result a load or show operation reports.
pub type AdResult = Result<AdDetails, AdapterError>;

/// Caller-supplied callback receiving an operation's result.
pub type Completion = Box<dyn FnOnce(AdResult) + Send>;

/// Holder for at most one pending completion.
///
/// Firing takes the callback out under the lock before invoking it, so two
/// near-simultaneous partner signals cannot both observe a pending slot;
/// whichever takes the callback fires it, the other sees an empty slot.
#[derive(Default)]
pub struct CompletionSlot {
    slot: Mutex<Option<Completion>>,
}

impl CompletionSlot {
    pub fn new() -> Self {
        CompletionSlot::default()
    }

    /// Store a pending completion. Sessions are single-use, so a prior
    /// pending completion only exists on caller misuse; it is dropped
    /// unfired and logged.
    pub fn store(&self, completion: Completion) {
        if self.slot.lock().replace(completion).is_some() {
            log::warn!("replaced a pending completion that never fired");
        }
    }

    /// Fire and clear. Returns `false` when the slot was already empty, in
    /// which case the result is dropped by the caller with a diagnostic.
    pub fn fire(&self, result: AdResult) -> bool {
        let Some(completion) = self.slot.lock().take() else {
            return false;
        };
        completion(result);
        true
    }

    /// Drop any pending completion without firing it. Returns whether one
    /// was pending.
    pub fn clear(&self) -> bool {
        self.slot.lock().take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.lock().is_some()
    }
}

/// Ad lifecycle events forwarded to the mediation side.
///
/// Events may arrive zero or more times each, on whatever thread the
/// partner SDK delivers them.
pub trait AdLifecycleDelegate: Send + Sync {
    fn did_track_impression(&self, details: &AdDetails);
    fn did_click(&self, details: &AdDetails);
    fn did_reward(&self, details: &AdDetails);
    fn did_dismiss(&self, details: &AdDetails, error: Option<AdapterError>);
}

/// Non-owning handle to the caller's delegate.
///
/// The caller owns the delegate's lifetime; the adapter never extends it.
/// Events arriving after the delegate is gone are dropped with a
/// diagnostic, not an error.
pub struct DelegateHandle {
    inner: Weak<dyn AdLifecycleDelegate>,
}

impl DelegateHandle {
    pub fn new(delegate: &Arc<dyn AdLifecycleDelegate>) -> Self {
        DelegateHandle {
            inner: Arc::downgrade(delegate),
        }
    }

    /// Dispatch an event against the delegate if it is still alive.
    pub fn notify(&self, event: &str, dispatch: impl FnOnce(&dyn AdLifecycleDelegate)) {
        match self.inner.upgrade() {
            Some(delegate) => dispatch(delegate.as_ref()),
            None => log::debug!("delegate is gone, dropped {} event", event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_completion(counter: &Arc<AtomicUsize>) -> Completion {
        let counter = Arc::clone(counter);
        Box::new(move |_result| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_slot_fires_exactly_once() {
        let slot = CompletionSlot::new();
        let fired = Arc::new(AtomicUsize::new(0));
        slot.store(counting_completion(&fired));

        assert!(slot.fire(Ok(AdDetails::new())));
        assert!(!slot.fire(Ok(AdDetails::new())));
        assert!(!slot.fire(Err(AdapterError::AdNotReady)));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fire_on_empty_slot_reports_dropped() {
        let slot = CompletionSlot::new();
        assert!(!slot.fire(Ok(AdDetails::new())));
    }

    #[test]
    fn test_clear_drops_pending_without_firing() {
        let slot = CompletionSlot::new();
        let fired = Arc::new(AtomicUsize::new(0));
        slot.store(counting_completion(&fired));

        assert!(slot.clear());
        assert!(!slot.clear());
        assert!(!slot.fire(Ok(AdDetails::new())));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_store_replaces_unfired_completion() {
        let slot = CompletionSlot::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        slot.store(counting_completion(&first));
        slot.store(counting_completion(&second));

        assert!(slot.fire(Ok(AdDetails::new())));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    struct CountingDelegate {
        impressions: AtomicUsize,
    }

    impl AdLifecycleDelegate for CountingDelegate {
        fn did_track_impression(&self, _details: &AdDetails) {
            self.impressions.fetch_add(1, Ordering::SeqCst);
        }
        fn did_click(&self, _details: &AdDetails) {}
        fn did_reward(&self, _details: &AdDetails) {}
        fn did_dismiss(&self, _details: &AdDetails, _error: Option<AdapterError>) {}
    }

    #[test]
    fn test_delegate_handle_dispatches_while_alive() {
        let delegate: Arc<dyn AdLifecycleDelegate> = Arc::new(CountingDelegate {
            impressions: AtomicUsize::new(0),
        });
        let handle = DelegateHandle::new(&delegate);

        handle.notify("impression", |d| d.did_track_impression(&AdDetails::new()));

        drop(delegate);
        // Dropped silently once the caller released the delegate.
        handle.notify("impression", |d| d.did_track_impression(&AdDetails::new()));
    }
}
