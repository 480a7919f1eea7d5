use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use ms_transaction::Transaction;

/// The four mempool mutation kinds listeners can subscribe to (spec §4.5,
/// C6). Each carries a non-empty batch; empty batches are never emitted.
#[derive(Debug, Clone)]
pub enum MempoolEvent {
    AddedUnconfirmed(Vec<Transaction>),
    RemovedUnconfirmed(Vec<Transaction>),
    AddedConfirmed(Vec<Transaction>),
    AddedDoubleSpending(Vec<Transaction>),
}

impl MempoolEvent {
    fn batch(&self) -> &[Transaction] {
        match self {
            MempoolEvent::AddedUnconfirmed(b)
            | MempoolEvent::RemovedUnconfirmed(b)
            | MempoolEvent::AddedConfirmed(b)
            | MempoolEvent::AddedDoubleSpending(b) => b,
        }
    }
}

pub trait MempoolListener: Send + Sync {
    fn on_event(&self, event: &MempoolEvent);
}

impl<F: Fn(&MempoolEvent) + Send + Sync> MempoolListener for F {
    fn on_event(&self, event: &MempoolEvent) {
        self(event)
    }
}

/// Typed listener fan-out for mempool mutations (spec §4.5, C6).
///
/// Listener invocation is synchronous, on the thread that completed the
/// mutation, after the storage transaction has committed (spec §4.5).
/// Listeners are copy-on-write (spec §5): `subscribe` clones the whole
/// vector rather than locking for the duration of dispatch, so dispatch
/// never blocks a concurrent `subscribe`.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<Arc<dyn MempoolListener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus {
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, listener: Arc<dyn MempoolListener>) {
        let mut listeners = self.listeners.write();
        let mut next = Vec::with_capacity(listeners.len() + 1);
        next.extend(listeners.iter().cloned());
        next.push(listener);
        *listeners = next;
    }

    /// Dispatches `event` to every listener, isolating panics so one
    /// misbehaving listener cannot stop the rest from observing the event
    /// or poison event ordering for the next batch (spec §7: "Event
    /// listener exceptions are isolated to preserve notification
    /// ordering").
    pub fn emit(&self, event: MempoolEvent) {
        if event.batch().is_empty() {
            return;
        }

        let listeners = self.listeners.read().clone();
        for listener in listeners.iter() {
            let event_ref = &event;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event_ref)));
            if outcome.is_err() {
                log::error!("mempool event listener panicked; isolating and continuing");
            }
        }
    }
}
