//! Shared test fixtures: a programmable, call-recording queue backend and
//! ticket/queue constructors.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::backend::error::Result;
use crate::backend::{BackendError, QueueBackend};
use crate::types::{
    EtaSnapshot, QueueConfig, QueueId, QueueSummary, Ticket, TicketId, TicketStatus, UserId,
};

pub fn ticket(id: &str, queue: &str, user: &str, status: TicketStatus, position: u32) -> Ticket {
    Ticket {
        ticket_id: TicketId::new(id),
        queue_id: QueueId::new(queue),
        user_id: UserId::new(user),
        status,
        position,
        joined_at: Utc::now(),
        estimated_wait_minutes: position as f64 * 2.0,
    }
}

pub fn waiting_ticket(id: &str, queue: &str, user: &str, position: u32) -> Ticket {
    ticket(id, queue, user, TicketStatus::Waiting, position)
}

pub fn queue_summary(id: &str, waiting: u32) -> QueueSummary {
    QueueSummary {
        queue_id: QueueId::new(id),
        name: format!("queue {id}"),
        description: "No description".to_string(),
        is_active: true,
        waiting_count: waiting,
        max_capacity: 100,
        average_service_time_minutes: 5.0,
    }
}

/// A programmable in-memory [`QueueBackend`] that records every call it
/// receives, so tests can assert not only on returned state but on which
/// network operations were (or were not) issued.
#[derive(Default)]
pub struct MockBackend {
    /// Response for `user_tickets`.
    tickets: Mutex<Vec<Ticket>>,
    /// Authoritative queue summaries for `queues`/`queue`/`advance_queue`.
    queues: Mutex<Vec<QueueSummary>>,
    /// Responses for `queue_status`, consumed front-to-back; the final
    /// element repeats once the script is exhausted.
    statuses: Mutex<VecDeque<Ticket>>,
    /// The most recently served status, replayed while the script is empty.
    last_status: Mutex<Option<Ticket>>,
    /// Response for `join_queue`.
    join_ticket: Mutex<Option<Ticket>>,
    /// Artificial latency applied to `queue_status`, read at call entry.
    status_delay: Mutex<Option<Duration>>,
    /// When set, every operation fails with a network error.
    network_down: AtomicBool,
    /// When set, `eta` fails with a network error.
    eta_failure: AtomicBool,
    /// When set, single-queue reads fail with a network error.
    queue_read_failure: AtomicBool,
    /// When set, `join_queue` fails with a conflict.
    join_conflict: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tickets(&self, tickets: Vec<Ticket>) {
        *self.tickets.lock().unwrap() = tickets;
    }

    pub fn set_queues(&self, queues: Vec<QueueSummary>) {
        *self.queues.lock().unwrap() = queues;
    }

    pub fn set_waiting_count(&self, queue: &QueueId, waiting: u32) {
        let mut queues = self.queues.lock().unwrap();
        if let Some(q) = queues.iter_mut().find(|q| &q.queue_id == queue) {
            q.waiting_count = waiting;
        }
    }

    pub fn push_status(&self, ticket: Ticket) {
        self.statuses.lock().unwrap().push_back(ticket);
    }

    pub fn set_join_ticket(&self, ticket: Ticket) {
        *self.join_ticket.lock().unwrap() = Some(ticket);
    }

    pub fn set_status_delay(&self, delay: Option<Duration>) {
        *self.status_delay.lock().unwrap() = delay;
    }

    pub fn set_network_down(&self, down: bool) {
        self.network_down.store(down, Ordering::SeqCst);
    }

    pub fn set_eta_failure(&self, failing: bool) {
        self.eta_failure.store(failing, Ordering::SeqCst);
    }

    pub fn fail_queue_reads(&self, failing: bool) {
        self.queue_read_failure.store(failing, Ordering::SeqCst);
    }

    pub fn set_join_conflict(&self, conflict: bool) {
        self.join_conflict.store(conflict, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_network(&self) -> Result<()> {
        if self.network_down.load(Ordering::SeqCst) {
            Err(BackendError::network("backend offline"))
        } else {
            Ok(())
        }
    }

    fn next_status(&self) -> Option<Ticket> {
        let mut statuses = self.statuses.lock().unwrap();
        match statuses.pop_front() {
            Some(ticket) => {
                *self.last_status.lock().unwrap() = Some(ticket.clone());
                Some(ticket)
            }
            None => self.last_status.lock().unwrap().clone(),
        }
    }
}

#[async_trait]
impl QueueBackend for MockBackend {
    async fn queues(&self) -> Result<Vec<QueueSummary>> {
        self.record("queues".to_string());
        self.check_network()?;
        Ok(self.queues.lock().unwrap().clone())
    }

    async fn queue(&self, queue: &QueueId) -> Result<QueueSummary> {
        self.record(format!("queue({queue})"));
        self.check_network()?;
        if self.queue_read_failure.load(Ordering::SeqCst) {
            return Err(BackendError::network("queue read unavailable"));
        }
        self.queues
            .lock()
            .unwrap()
            .iter()
            .find(|q| &q.queue_id == queue)
            .cloned()
            .ok_or_else(|| BackendError::Api {
                status: 404,
                message: format!("queue {queue} not found"),
            })
    }

    async fn join_queue(&self, queue: &QueueId, user: &UserId) -> Result<Ticket> {
        self.record(format!("join({queue},{user})"));
        self.check_network()?;
        if self.join_conflict.load(Ordering::SeqCst) {
            return Err(BackendError::conflict("user already waiting in this queue"));
        }
        self.join_ticket
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BackendError::Api {
                status: 500,
                message: "no join response configured".to_string(),
            })
    }

    async fn queue_status(&self, queue: &QueueId, ticket: &TicketId) -> Result<Ticket> {
        self.record(format!("status({queue},{ticket})"));
        let delay = *self.status_delay.lock().unwrap();
        let next = self.next_status();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_network()?;
        next.ok_or_else(|| BackendError::Api {
            status: 404,
            message: format!("ticket {ticket} not found"),
        })
    }

    async fn eta(
        &self,
        queue: &QueueId,
        ticket: &TicketId,
        position: u32,
    ) -> Result<EtaSnapshot> {
        self.record(format!("eta({queue},{ticket},{position})"));
        self.check_network()?;
        if self.eta_failure.load(Ordering::SeqCst) {
            return Err(BackendError::network("estimate endpoint unavailable"));
        }
        Ok(EtaSnapshot {
            queue_id: queue.clone(),
            ticket_id: ticket.clone(),
            estimated_wait_minutes: position as f64 * 2.0,
            p50_wait_minutes: position as f64 * 1.5,
            p90_wait_minutes: position as f64 * 3.0,
            service_rate: 0.5,
            updated_at: Utc::now(),
        })
    }

    async fn user_tickets(&self, user: &UserId) -> Result<Vec<Ticket>> {
        self.record(format!("user_tickets({user})"));
        self.check_network()?;
        Ok(self.tickets.lock().unwrap().clone())
    }

    async fn advance_queue(&self, queue: &QueueId, count: u32) -> Result<u32> {
        self.record(format!("advance({queue},{count})"));
        self.check_network()?;
        let mut queues = self.queues.lock().unwrap();
        let summary = queues
            .iter_mut()
            .find(|q| &q.queue_id == queue)
            .ok_or_else(|| BackendError::Api {
                status: 404,
                message: format!("queue {queue} not found"),
            })?;
        let processed = count.min(summary.waiting_count);
        summary.waiting_count -= processed;
        Ok(processed)
    }

    async fn create_queue(&self, config: &QueueConfig) -> Result<QueueSummary> {
        self.record(format!("create({})", config.name));
        self.check_network()?;
        let summary = QueueSummary {
            queue_id: QueueId::new(format!("q-{}", self.queues.lock().unwrap().len() + 1)),
            name: config.name.clone(),
            description: config.description.clone(),
            is_active: config.is_active,
            waiting_count: 0,
            max_capacity: config.max_capacity,
            average_service_time_minutes: 5.0,
        };
        self.queues.lock().unwrap().push(summary.clone());
        Ok(summary)
    }

    async fn update_queue(&self, queue: &QueueId, config: &QueueConfig) -> Result<QueueSummary> {
        self.record(format!("update({queue})"));
        self.check_network()?;
        let mut queues = self.queues.lock().unwrap();
        let summary = queues
            .iter_mut()
            .find(|q| &q.queue_id == queue)
            .ok_or_else(|| BackendError::Api {
                status: 404,
                message: format!("queue {queue} not found"),
            })?;
        summary.name = config.name.clone();
        summary.description = config.description.clone();
        summary.is_active = config.is_active;
        summary.max_capacity = config.max_capacity;
        Ok(summary.clone())
    }

    async fn delete_queue(&self, queue: &QueueId) -> Result<()> {
        self.record(format!("delete({queue})"));
        self.check_network()?;
        self.queues.lock().unwrap().retain(|q| &q.queue_id != queue);
        Ok(())
    }
}
