//! The queue backend capability seam.
//!
//! Everything the engine needs from the backend is expressed as the
//! [`QueueBackend`] trait, so the synchronizer, detail poller, and admin
//! controller can be exercised against an in-memory fake while production
//! code talks HTTP through [`HttpQueueBackend`].
//!
//! The backend is the sole source of truth for ticket positions and waiting
//! counts; this crate never advances either optimistically.

use async_trait::async_trait;

use crate::types::{EtaSnapshot, QueueConfig, QueueId, QueueSummary, Ticket, TicketId, UserId};

pub mod error;
pub mod http;

pub use error::BackendError;
pub use http::HttpQueueBackend;

/// Semantic surface of the queue backend.
///
/// Reads may fail with [`BackendError::Network`] and degrade; writes
/// (`join_queue`, `advance_queue`, the admin CRUD) are never retried by this
/// crate - the user re-triggers them explicitly.
#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Lists all queues.
    async fn queues(&self) -> error::Result<Vec<QueueSummary>>;

    /// Fetches one queue's summary.
    async fn queue(&self, queue: &QueueId) -> error::Result<QueueSummary>;

    /// Joins a queue, returning the freshly issued ticket.
    async fn join_queue(&self, queue: &QueueId, user: &UserId) -> error::Result<Ticket>;

    /// Fetches the current status of one ticket.
    async fn queue_status(&self, queue: &QueueId, ticket: &TicketId) -> error::Result<Ticket>;

    /// Fetches the advisory wait estimate for a ticket at a given position.
    async fn eta(
        &self,
        queue: &QueueId,
        ticket: &TicketId,
        position: u32,
    ) -> error::Result<EtaSnapshot>;

    /// Fetches the full ticket list for a user.
    async fn user_tickets(&self, user: &UserId) -> error::Result<Vec<Ticket>>;

    /// Advances the line by `count`, returning how many tickets the backend
    /// actually processed.
    async fn advance_queue(&self, queue: &QueueId, count: u32) -> error::Result<u32>;

    /// Creates a queue. Pass-through administrative operation.
    async fn create_queue(&self, config: &QueueConfig) -> error::Result<QueueSummary>;

    /// Updates a queue. Pass-through administrative operation.
    async fn update_queue(
        &self,
        queue: &QueueId,
        config: &QueueConfig,
    ) -> error::Result<QueueSummary>;

    /// Deletes a queue. Pass-through administrative operation.
    async fn delete_queue(&self, queue: &QueueId) -> error::Result<()>;
}
