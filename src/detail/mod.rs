//! Per-ticket detail polling.
//!
//! While a ticket's detail view is open, a dedicated loop refreshes its
//! status (and, when it still holds a queue position, its wait estimate) on
//! a slower cadence than the list sync. Responses can arrive out of order
//! with respect to `close`/`open` of the view, so every refresh carries a
//! generation token: a response whose token no longer matches the current
//! generation is discarded instead of resurrecting state for a view that was
//! torn down or reopened since the request was issued.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::backend::QueueBackend;
use crate::notify::PositionObserver;
use crate::scheduler::{self, PollHandle};
use crate::types::{EtaSnapshot, QueueId, Ticket, TicketId};

/// The latest applied view of one tracked ticket.
#[derive(Debug, Clone, Default)]
pub struct DetailState {
    pub ticket: Option<Ticket>,
    pub eta: Option<EtaSnapshot>,
}

/// Polls one ticket's status and wait estimate while its view is open.
pub struct TicketDetailPoller<B> {
    backend: Arc<B>,
    queue_id: QueueId,
    ticket_id: TicketId,
    interval: Duration,
    /// Bumped on every refresh issue and on `close`; a response is applied
    /// only if its issue-time token still matches.
    generation: Arc<AtomicU64>,
    state: Arc<Mutex<DetailState>>,
    observer: Option<Arc<dyn PositionObserver>>,
    handle: Option<PollHandle>,
}

/// Everything one refresh needs, cloneable into the spawned poll action.
struct RefreshContext<B> {
    backend: Arc<B>,
    queue_id: QueueId,
    ticket_id: TicketId,
    generation: Arc<AtomicU64>,
    state: Arc<Mutex<DetailState>>,
    observer: Option<Arc<dyn PositionObserver>>,
}

impl<B> Clone for RefreshContext<B> {
    fn clone(&self) -> Self {
        RefreshContext {
            backend: Arc::clone(&self.backend),
            queue_id: self.queue_id.clone(),
            ticket_id: self.ticket_id.clone(),
            generation: Arc::clone(&self.generation),
            state: Arc::clone(&self.state),
            observer: self.observer.clone(),
        }
    }
}

impl<B: QueueBackend + 'static> RefreshContext<B> {
    #[instrument(skip(self), fields(ticket = %self.ticket_id))]
    async fn run(self) {
        // The token is taken at issue time; anything that bumps the
        // generation while this request is in flight invalidates the result.
        let issued = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let ticket = match self
            .backend
            .queue_status(&self.queue_id, &self.ticket_id)
            .await
        {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "ticket status refresh failed");
                return;
            }
        };

        let eta = if ticket.position > 0 {
            match self
                .backend
                .eta(&self.queue_id, &self.ticket_id, ticket.position)
                .await
            {
                Ok(eta) => Some(eta),
                Err(e) => {
                    // Keep showing the previous estimate rather than blanking.
                    debug!(error = %e, "wait estimate refresh failed");
                    None
                }
            }
        } else {
            None
        };

        if self.generation.load(Ordering::SeqCst) != issued {
            debug!("discarding superseded detail response");
            return;
        }

        {
            let mut state = self.state.lock().unwrap();
            state.ticket = Some(ticket.clone());
            if ticket.position > 0 {
                if let Some(eta) = eta {
                    state.eta = Some(eta);
                }
            } else {
                state.eta = None;
            }
        }

        if let Some(observer) = &self.observer {
            observer.position_changed(&ticket).await;
        }
    }
}

impl<B: QueueBackend + 'static> TicketDetailPoller<B> {
    pub fn new(backend: Arc<B>, queue_id: QueueId, ticket_id: TicketId, interval: Duration) -> Self {
        TicketDetailPoller {
            backend,
            queue_id,
            ticket_id,
            interval,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(Mutex::new(DetailState::default())),
            observer: None,
            handle: None,
        }
    }

    /// Registers a position observer, fed after every applied refresh.
    pub fn with_observer(mut self, observer: Arc<dyn PositionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn context(&self) -> RefreshContext<B> {
        RefreshContext {
            backend: Arc::clone(&self.backend),
            queue_id: self.queue_id.clone(),
            ticket_id: self.ticket_id.clone(),
            generation: Arc::clone(&self.generation),
            state: Arc::clone(&self.state),
            observer: self.observer.clone(),
        }
    }

    /// Opens the detail view: refreshes immediately, then on the cadence.
    ///
    /// Reopening an already open view restarts the loop; any response still
    /// in flight from before the reopen is superseded.
    pub fn open(&mut self) {
        self.close_handle();

        let ctx = self.context();
        tokio::spawn(ctx.clone().run());
        self.handle = Some(scheduler::start(self.interval, move || {
            Box::pin(ctx.clone().run())
        }));
    }

    /// Closes the detail view: stops the loop and invalidates any response
    /// still in flight.
    pub fn close(&mut self) {
        self.close_handle();
        if let Some(observer) = &self.observer {
            observer.tracking_ended(&self.ticket_id);
        }
    }

    fn close_handle(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_stopped())
    }

    pub fn state(&self) -> DetailState {
        self.state.lock().unwrap().clone()
    }
}

impl<B> Drop for TicketDetailPoller<B> {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
