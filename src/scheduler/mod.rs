//! Generic repeating-task primitive.
//!
//! Every polling loop in this crate is built on [`start`]: it spawns a tokio
//! task that invokes a bound action once per interval until the returned
//! [`PollHandle`] is stopped.
//!
//! # Rebinding
//!
//! The timer is created once per `start` call, but the action lives in a
//! mutable holder that [`PollHandle::rebind`] swaps out. Each tick reads the
//! holder, so the loop always invokes the *latest* bound action. Capturing
//! the action by value at `start` time would instead freeze whatever closure
//! the owner happened to hold at that moment, and owners that rebind their
//! refresh logic per render would poll stale state for the life of the timer.
//!
//! # Stopping
//!
//! Stopping cancels future ticks only. Work already in flight from the last
//! tick keeps running; the owning component is responsible for making such
//! work a no-op (see the generation token in
//! [`TicketDetailPoller`](crate::detail::TicketDetailPoller)).
//!
//! Scheduler instances are fully independent: no global registry, no
//! cross-instance ordering.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// The boxed future a poll action produces per tick.
pub type PollFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

type PollAction = Arc<dyn Fn() -> PollFuture + Send + Sync>;

/// Handle to one running polling loop.
///
/// Dropping the handle stops the loop, so an owner that replaces its handle
/// cannot leak a timer.
pub struct PollHandle {
    action: Arc<Mutex<PollAction>>,
    cancel: CancellationToken,
}

impl PollHandle {
    /// Swaps in a new action without restarting the timer.
    ///
    /// The next tick (and every tick after) invokes the new action.
    pub fn rebind<F>(&self, action: F)
    where
        F: Fn() -> PollFuture + Send + Sync + 'static,
    {
        *self.action.lock().unwrap() = Arc::new(action);
    }

    /// Cancels future ticks. In-flight work from the last tick is unaffected.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Returns true once the loop has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Starts a polling loop that invokes `action` once per `interval`.
///
/// The action is not invoked at start time; the first invocation happens one
/// full interval after `start` returns. A tick's work is spawned rather than
/// awaited, so a slow action overlapping the next tick is permitted by
/// design - correctness against stale results is the caller's job.
pub fn start<F>(interval: Duration, action: F) -> PollHandle
where
    F: Fn() -> PollFuture + Send + Sync + 'static,
{
    let action: Arc<Mutex<PollAction>> = Arc::new(Mutex::new(Arc::new(action)));
    let cancel = CancellationToken::new();

    let loop_action = Arc::clone(&action);
    let loop_cancel = cancel.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // tokio intervals complete their first tick immediately; consume it
        // so the action only runs on subsequent ticks.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = loop_cancel.cancelled() => {
                    trace!("polling loop stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let current = Arc::clone(&*loop_action.lock().unwrap());
                    tokio::spawn(current());
                }
            }
        }
    });

    PollHandle { action, cancel }
}
