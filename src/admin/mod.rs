//! Operator-side queue control.
//!
//! The controller keeps a snapshot of queue summaries (refreshed on the
//! admin cadence) and gates advance operations on it: an advance that the
//! snapshot already shows to be impossible is rejected locally without a
//! network round trip. "Advance all" additionally re-reads the queue at
//! confirmation time, so the count actually sent reflects whatever the
//! backend holds at that moment rather than a snapshot that may be several
//! seconds stale.
//!
//! Advancing never decrements the local count by arithmetic; the snapshot is
//! refreshed from the backend afterwards so that concurrent joins and other
//! operators are reflected rather than guessed at.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::backend::{BackendError, QueueBackend};
use crate::types::{QueueConfig, QueueId, QueueSummary};

/// Errors from admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The advance cannot be satisfied: requested more tickets than the
    /// queue currently has waiting (or requested zero).
    #[error("queue {queue} cannot advance {requested} (waiting: {available})")]
    Ineligible {
        queue: QueueId,
        requested: u32,
        available: u32,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, AdminError>;

/// Drives queue-advance and queue-management operations for an operator.
pub struct AdminQueueController<B> {
    backend: Arc<B>,
    summaries: Mutex<HashMap<QueueId, QueueSummary>>,
}

impl<B: QueueBackend> AdminQueueController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        AdminQueueController {
            backend,
            summaries: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the snapshot with the backend's current queue list.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<QueueSummary>> {
        let queues = self.backend.queues().await?;
        let mut summaries = self.summaries.lock().unwrap();
        summaries.clear();
        for q in &queues {
            summaries.insert(q.queue_id.clone(), q.clone());
        }
        Ok(queues)
    }

    /// The waiting count the snapshot holds for a queue (0 if unknown).
    pub fn known_waiting_count(&self, queue: &QueueId) -> u32 {
        self.summaries
            .lock()
            .unwrap()
            .get(queue)
            .map(|q| q.waiting_count)
            .unwrap_or(0)
    }

    /// Whether the snapshot permits advancing `count` tickets.
    pub fn can_advance(&self, queue: &QueueId, count: u32) -> bool {
        count > 0 && self.known_waiting_count(queue) >= count
    }

    /// Advances `count` tickets, then refreshes the queue's snapshot entry.
    ///
    /// Returns the number the backend actually processed, which can be lower
    /// than requested when the queue drained concurrently.
    #[instrument(skip(self))]
    pub async fn advance(&self, queue: &QueueId, count: u32) -> Result<u32> {
        let available = self.known_waiting_count(queue);
        if count == 0 || available < count {
            return Err(AdminError::Ineligible {
                queue: queue.clone(),
                requested: count,
                available,
            });
        }

        let processed = self.backend.advance_queue(queue, count).await?;
        info!(%queue, requested = count, processed, "queue advanced");
        self.refresh_one(queue).await;
        Ok(processed)
    }

    /// Advances every waiting ticket in one operation.
    ///
    /// The snapshot gates the attempt, but the count sent is re-read from the
    /// backend at confirmation time: the queue may have grown or drained
    /// since the last refresh, and clearing it means clearing what is there
    /// *now*.
    #[instrument(skip(self))]
    pub async fn advance_all(&self, queue: &QueueId) -> Result<u32> {
        let known = self.known_waiting_count(queue);
        if known == 0 {
            return Err(AdminError::Ineligible {
                queue: queue.clone(),
                requested: 0,
                available: 0,
            });
        }

        let fresh = self.backend.queue(queue).await?;
        if fresh.waiting_count == 0 {
            debug!(%queue, "queue drained before advance-all confirmation");
            return Err(AdminError::Ineligible {
                queue: queue.clone(),
                requested: 0,
                available: 0,
            });
        }

        let processed = self.backend.advance_queue(queue, fresh.waiting_count).await?;
        info!(%queue, requested = fresh.waiting_count, processed, "queue cleared");
        self.refresh_one(queue).await;
        Ok(processed)
    }

    pub async fn create_queue(&self, config: &QueueConfig) -> Result<QueueSummary> {
        let summary = self.backend.create_queue(config).await?;
        info!(queue = %summary.queue_id, name = %summary.name, "queue created");
        self.summaries
            .lock()
            .unwrap()
            .insert(summary.queue_id.clone(), summary.clone());
        Ok(summary)
    }

    pub async fn update_queue(&self, queue: &QueueId, config: &QueueConfig) -> Result<QueueSummary> {
        let summary = self.backend.update_queue(queue, config).await?;
        self.summaries
            .lock()
            .unwrap()
            .insert(summary.queue_id.clone(), summary.clone());
        Ok(summary)
    }

    pub async fn delete_queue(&self, queue: &QueueId) -> Result<()> {
        self.backend.delete_queue(queue).await?;
        info!(%queue, "queue deleted");
        self.summaries.lock().unwrap().remove(queue);
        Ok(())
    }

    /// Best-effort re-read of one queue's summary after a mutation. A failed
    /// read leaves the stale entry in place until the next full refresh.
    async fn refresh_one(&self, queue: &QueueId) {
        match self.backend.queue(queue).await {
            Ok(summary) => {
                self.summaries
                    .lock()
                    .unwrap()
                    .insert(summary.queue_id.clone(), summary);
            }
            Err(e) => {
                warn!(%queue, error = %e, "post-advance summary refresh failed");
            }
        }
    }
}
