//! Trailing-edge debounce primitive.
//!
//! # Responsibility
//! - Run an action once a fixed quiet period has elapsed since the last
//!   `schedule` call.
//! - Own the single pending-task handle so callers never juggle timers.
//!
//! # Invariants
//! - At most one task is pending; `schedule` always cancels first.
//! - The delay restarts on every `schedule`; there is no maximum wait.
//! - Cancellation is cooperative: a task re-checks its generation after the
//!   sleep and before running the action. An action that already started runs
//!   to completion.
//! - Actions run on the blocking pool so slow I/O never stalls the runtime.

use log::{debug, error, trace};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Cancel-and-restart delayed runner bound to one runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    runtime: Handle,
    pending: Option<JoinHandle<()>>,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    /// Creates a debouncer spawning its delayed tasks on `runtime`.
    pub fn new(delay: Duration, runtime: Handle) -> Self {
        Self {
            delay,
            runtime,
            pending: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns whether a scheduled action has not finished yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancels any pending action and schedules `action` after the delay.
    pub fn schedule<F>(&mut self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let ticket = self.generation.load(Ordering::SeqCst);
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) != ticket {
                debug!("event=debounce_fire module=debounce status=skipped reason=superseded");
                return;
            }
            trace!("event=debounce_fire module=debounce status=start");
            // Runs off the runtime thread; aborting this task leaves a
            // started action running to completion.
            if let Err(err) = tokio::task::spawn_blocking(action).await {
                error!("event=debounce_fire module=debounce status=error error={err}");
            }
        });
        self.pending = Some(handle);
    }

    /// Cancels the pending action, if any.
    ///
    /// Returns `true` when a not-yet-finished task was cancelled.
    pub fn cancel(&mut self) -> bool {
        self.generation.fetch_add(1, Ordering::SeqCst);
        match self.pending.take() {
            Some(handle) => {
                let live = !handle.is_finished();
                handle.abort();
                if live {
                    trace!("event=debounce_cancel module=debounce status=ok");
                }
                live
            }
            None => false,
        }
    }
}
