use std::sync::Arc;

use futures::future::{AbortHandle, Abortable};
use parking_lot::Mutex;

use crate::error::ProcessorError;
use crate::processor::TransactionProcessor;

/// The three cooperative periodic tasks of spec §4.7, C8: ExpirySweeper,
/// Rebroadcaster, PeerPuller. Each owns its period and is driven by its own
/// `tokio::time::interval` (a missed tick is skipped, not coalesced, per
/// spec §5 "Scheduling").
///
/// Modeled the way the teacher's `Mempool::start_executor`/`stop_executor`
/// pair drives its single gossip-consuming task: an `AbortHandle` per
/// spawned future, collected here so `stop` can cancel all three without
/// waiting for their next tick.
pub struct Workers {
    handles: Mutex<Vec<AbortHandle>>,
}

impl Default for Workers {
    fn default() -> Self {
        Self::new()
    }
}

impl Workers {
    pub fn new() -> Self {
        Workers {
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawns all three workers against `processor`. Idempotent only in the
    /// sense that calling it twice spawns two independent sets; callers
    /// should call `stop` first if they mean to restart.
    pub fn start(&self, processor: Arc<TransactionProcessor>) {
        let sweep_period = processor.config().sweep_period;
        let rebroadcast_period = processor.config().rebroadcast_period;
        let peer_pull_period = processor.config().peer_pull_period;

        self.spawn(processor.clone(), sweep_period, |p| {
            Box::pin(async move {
                if let Err(e) = p.sweep_expired() {
                    handle_worker_error("expiry sweeper", e);
                }
            })
        });

        self.spawn(processor.clone(), rebroadcast_period, |p| {
            Box::pin(async move {
                if let Err(e) = p.rebroadcast().await {
                    handle_worker_error("rebroadcaster", e);
                }
            })
        });

        self.spawn(processor, peer_pull_period, |p| {
            Box::pin(async move {
                if let Err(e) = p.pull_from_peer().await {
                    handle_worker_error("peer puller", e);
                }
            })
        });
    }

    fn spawn<F>(&self, processor: Arc<TransactionProcessor>, period: std::time::Duration, tick: F)
    where
        F: Fn(Arc<TransactionProcessor>) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
            + Send
            + 'static,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let task = async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                tick(processor.clone()).await;
            }
        };
        tokio::spawn(Abortable::new(task, registration));
        self.handles.lock().push(handle);
    }

    /// Observed by the workers between ticks (spec §5, "Cancellation"):
    /// there is no mid-tick cancellation, but the next tick never starts
    /// once `stop` has run.
    pub fn stop(&self) {
        for handle in self.handles.lock().drain(..) {
            handle.abort();
        }
    }
}

/// Two nested error handlers (spec §7): recoverable `ProcessorError`s are
/// logged and the worker keeps ticking; `Fatal` is unexpected internal
/// invariant breakage and terminates the process after logging.
fn handle_worker_error(worker: &str, error: ProcessorError) {
    match error {
        ProcessorError::Fatal(reason) => {
            log::error!("{worker} hit a fatal invariant violation: {reason}");
            std::process::exit(1);
        }
        other => log::warn!("{worker} tick failed: {other}"),
    }
}
