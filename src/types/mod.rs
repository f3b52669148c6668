//! Core domain types for ticket tracking.

pub mod ids;
pub mod queue;
pub mod ticket;

pub use ids::{QueueId, TicketId, UserId};
pub use queue::{QueueConfig, QueueSummary};
pub use ticket::{EtaSnapshot, Ticket, TicketStatus};
