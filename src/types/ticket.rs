//! Ticket and ETA types.
//!
//! A [`Ticket`] is a user's claim to a position in one queue. Tickets are
//! created by a successful join call, mutated only by synchronization reads
//! (never optimistically advanced by the client), and leave the active set
//! the first time a sync observes a status other than `Waiting`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{QueueId, TicketId, UserId};

/// Lifecycle status of a ticket as reported by the backend.
///
/// `Waiting` is the only status the synchronizer tracks; all other statuses
/// are terminal for tracking purposes and remove the ticket from the active
/// set on the next sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Waiting,
    Called,
    Serving,
    Served,
    Completed,
    Cancelled,
    Expired,
    Notified,
}

impl TicketStatus {
    /// Returns true if the ticket is still in line.
    pub fn is_waiting(&self) -> bool {
        matches!(self, TicketStatus::Waiting)
    }

    /// Returns true if this status removes the ticket from the active set.
    pub fn is_terminal_for_tracking(&self) -> bool {
        !self.is_waiting()
    }
}

/// A user's position-in-line ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub ticket_id: TicketId,
    pub queue_id: QueueId,
    pub user_id: UserId,
    pub status: TicketStatus,
    /// 1-based position in line while waiting; 0 once no longer queued.
    pub position: u32,
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub estimated_wait_minutes: f64,
}

impl Ticket {
    /// Returns true if this ticket belongs in the active set.
    pub fn is_active(&self) -> bool {
        self.status.is_waiting()
    }
}

/// Advisory wait-time estimate for one ticket.
///
/// Always paired with a [`Ticket`], never persisted independently. How the
/// estimates are computed is the ETA service's business, not ours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtaSnapshot {
    pub queue_id: QueueId,
    pub ticket_id: TicketId,
    pub estimated_wait_minutes: f64,
    pub p50_wait_minutes: f64,
    pub p90_wait_minutes: f64,
    pub service_rate: f64,
    pub updated_at: DateTime<Utc>,
}
