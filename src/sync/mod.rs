//! Reconciliation of the authoritative per-user ticket list against the
//! local cache.
//!
//! The backend is the sole source of truth; the synchronizer never advances
//! a position or status optimistically. Each [`TicketSynchronizer::sync`]
//! is a two-tier read:
//!
//! 1. Ask the backend for the user's full ticket list, filter it to
//!    `WAITING`, wholesale-replace the cache with the filtered set, return it.
//! 2. If the backend is unreachable, fall back to the last cached snapshot
//!    (again filtered to `WAITING`) and flag the result as degraded rather
//!    than raising a fatal error - network unavailability must never blank
//!    the UI when a prior snapshot exists.
//!
//! The two tiers are never merged field-by-field; a partial merge could pair
//! a position from one source with a status it was never returned with.
//!
//! No automatic retries: each scheduled tick is itself the retry mechanism
//! for reads, and `join` is only re-issued when the user asks again.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::backend::{BackendError, QueueBackend};
use crate::cache::{LocalCacheEntry, TicketCache};
use crate::types::{QueueId, Ticket, UserId};

/// Result of one synchronization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTicketSet {
    /// The user's tickets currently in `WAITING` status.
    pub tickets: Vec<Ticket>,
    /// True when the set was served from the local cache because the
    /// authoritative backend was unreachable.
    pub degraded: bool,
}

impl ActiveTicketSet {
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }
}

/// Errors from [`TicketSynchronizer::join`].
#[derive(Debug, Error)]
pub enum JoinError {
    /// The local active set already holds a waiting ticket for this queue;
    /// no network call was issued.
    #[error("already waiting in queue {queue}")]
    AlreadyJoined { queue: QueueId },

    /// The backend rejected the join as a duplicate. No retry, no cache
    /// mutation.
    #[error("backend rejected join: {0}")]
    Conflict(String),

    /// The join could not be delivered or was otherwise rejected.
    #[error(transparent)]
    Backend(BackendError),
}

/// Reconciles locally cached ticket state with authoritative backend state
/// for one user.
///
/// This is the only component permitted to write the ticket cache, and it
/// always writes wholesale (last write wins, no partial merge).
pub struct TicketSynchronizer<B, C> {
    backend: Arc<B>,
    cache: C,
    user_id: UserId,
    active: Mutex<Vec<Ticket>>,
}

impl<B: QueueBackend, C: TicketCache> TicketSynchronizer<B, C> {
    pub fn new(backend: Arc<B>, cache: C, user_id: UserId) -> Self {
        TicketSynchronizer {
            backend,
            cache,
            user_id,
            active: Mutex::new(Vec::new()),
        }
    }

    /// The user this synchronizer tracks.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns a copy of the current active set without touching the network.
    pub fn active_tickets(&self) -> Vec<Ticket> {
        self.active.lock().unwrap().clone()
    }

    /// Reconciles the active set against the backend; see the module docs
    /// for the two-tier read.
    #[instrument(skip(self), fields(user = %self.user_id))]
    pub async fn sync(&self) -> ActiveTicketSet {
        match self.backend.user_tickets(&self.user_id).await {
            Ok(tickets) => {
                let waiting: Vec<Ticket> =
                    tickets.into_iter().filter(Ticket::is_active).collect();
                debug!(active = waiting.len(), "synchronized from backend");

                let entry = LocalCacheEntry::new(self.user_id.clone(), waiting.clone());
                if let Err(e) = self.cache.store(&entry) {
                    // A failed cache write only hurts the next offline
                    // fallback; the fresh set is still authoritative.
                    warn!(error = %e, "failed to persist ticket cache");
                }

                *self.active.lock().unwrap() = waiting.clone();
                ActiveTicketSet {
                    tickets: waiting,
                    degraded: false,
                }
            }
            Err(e) => {
                warn!(error = %e, "ticket sync failed, falling back to cache");
                let cached = match self.cache.load(&self.user_id) {
                    Ok(Some(entry)) => entry
                        .tickets
                        .into_iter()
                        .filter(Ticket::is_active)
                        .collect(),
                    Ok(None) => Vec::new(),
                    Err(e) => {
                        warn!(error = %e, "ticket cache unreadable");
                        Vec::new()
                    }
                };

                *self.active.lock().unwrap() = cached.clone();
                ActiveTicketSet {
                    tickets: cached,
                    degraded: true,
                }
            }
        }
    }

    /// Join-conflict guard: false if the active set already holds a waiting
    /// ticket for this queue.
    ///
    /// This is a client-side guard, not a substitute for the backend's own
    /// uniqueness check - the backend still rejects duplicates it sees.
    pub fn can_join(&self, queue: &QueueId) -> bool {
        !self
            .active
            .lock()
            .unwrap()
            .iter()
            .any(|t| &t.queue_id == queue && t.is_active())
    }

    /// Joins a queue on behalf of the tracked user.
    ///
    /// On success the new ticket is merged into the active set (no full
    /// resync required) and the cache is rewritten, so the caller can
    /// display it immediately.
    #[instrument(skip(self), fields(user = %self.user_id, queue = %queue))]
    pub async fn join(&self, queue: &QueueId) -> Result<Ticket, JoinError> {
        if !self.can_join(queue) {
            debug!("join suppressed by local guard");
            return Err(JoinError::AlreadyJoined {
                queue: queue.clone(),
            });
        }

        let ticket = self
            .backend
            .join_queue(queue, &self.user_id)
            .await
            .map_err(|e| match e {
                BackendError::Conflict { message } => JoinError::Conflict(message),
                other => JoinError::Backend(other),
            })?;

        let merged = {
            let mut active = self.active.lock().unwrap();
            active.push(ticket.clone());
            active.clone()
        };
        let entry = LocalCacheEntry::new(self.user_id.clone(), merged);
        if let Err(e) = self.cache.store(&entry) {
            warn!(error = %e, "failed to persist ticket cache after join");
        }

        Ok(ticket)
    }
}
