//! One-shot proximity alerts.
//!
//! When a tracked ticket's position reaches the proximity zone (position 3 or
//! better), the dispatcher fires a user-facing alert - at most once per
//! distinct position value. The dedup state is an explicit
//! `ticket → last notified position` map rather than a boolean flag, so a
//! position that changes again within the zone (3→2→1) gets one alert per
//! new value reached, while an unchanged position across polls never
//! re-fires.
//!
//! Alert delivery is best-effort: a failed audio cue or a denied notification
//! permission is swallowed (logged at debug) and the position is still
//! recorded as notified. Permission is requested at most once per process
//! lifetime, lazily, on the first alert that needs it.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::types::{QueueId, Ticket, TicketId};

/// The position at or below which an alert is warranted.
pub const PROXIMITY_THRESHOLD: u32 = 3;

/// Failure of a platform alert primitive. Never fatal for the dispatch.
#[derive(Debug, Error)]
#[error("alert failure: {0}")]
pub struct AlertError(pub String);

/// Outcome of the platform's notification-permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// One user-facing proximity alert.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityAlert {
    pub ticket_id: TicketId,
    pub queue_id: QueueId,
    pub position: u32,
    /// Keep the notification on screen until acknowledged when the user is
    /// next in line.
    pub require_interaction: bool,
}

/// Platform notification and audio primitives, as capability seams.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Asks the platform for notification permission.
    async fn request_permission(&self) -> Result<Permission, AlertError>;

    /// Displays a platform notification.
    async fn notify(&self, alert: &ProximityAlert) -> Result<(), AlertError>;

    /// Plays an audible cue.
    async fn play_cue(&self) -> Result<(), AlertError>;
}

/// Anything that wants to hear about fresh ticket positions.
///
/// Implemented by [`NotificationDispatcher`]; driven by
/// [`TicketDetailPoller`](crate::detail::TicketDetailPoller) whenever a
/// refresh produces a fresh position for the tracked ticket.
#[async_trait]
pub trait PositionObserver: Send + Sync {
    async fn position_changed(&self, ticket: &Ticket);

    /// The tracking view for this ticket was torn down.
    fn tracking_ended(&self, ticket: &TicketId);
}

/// Observes ticket position changes and fires at-most-once-per-value alerts.
pub struct NotificationDispatcher<S> {
    sink: S,
    last_notified: Mutex<HashMap<TicketId, u32>>,
    /// `None` until the first alert forces a permission request; the request
    /// happens at most once per process lifetime.
    permission: tokio::sync::Mutex<Option<Permission>>,
}

impl<S: AlertSink> NotificationDispatcher<S> {
    pub fn new(sink: S) -> Self {
        NotificationDispatcher {
            sink,
            last_notified: Mutex::new(HashMap::new()),
            permission: tokio::sync::Mutex::new(None),
        }
    }

    /// Feeds a freshly synchronized ticket to the dispatcher.
    ///
    /// Fires an alert iff the position is within the proximity zone and
    /// differs from the last notified position for this ticket (an absent
    /// entry is unequal to anything).
    pub async fn observe(&self, ticket: &Ticket) {
        let position = ticket.position;
        if position == 0 || position > PROXIMITY_THRESHOLD {
            return;
        }

        {
            let mut last = self.last_notified.lock().unwrap();
            if last.get(&ticket.ticket_id) == Some(&position) {
                return;
            }
            // Recorded before delivery: a failed or denied alert still
            // counts as notified for this position.
            last.insert(ticket.ticket_id.clone(), position);
        }

        if self.ensure_permission().await == Permission::Denied {
            debug!(ticket = %ticket.ticket_id, position, "notification permission denied");
            return;
        }

        let alert = ProximityAlert {
            ticket_id: ticket.ticket_id.clone(),
            queue_id: ticket.queue_id.clone(),
            position,
            require_interaction: position == 1,
        };
        if let Err(e) = self.sink.notify(&alert).await {
            debug!(ticket = %ticket.ticket_id, error = %e, "notification failed");
        }
        if let Err(e) = self.sink.play_cue().await {
            debug!(ticket = %ticket.ticket_id, error = %e, "audio cue failed");
        }
    }

    /// Clears the notified state for a ticket; called when its tracking view
    /// is torn down so a reopened view can alert again.
    pub fn reset(&self, ticket: &TicketId) {
        self.last_notified.lock().unwrap().remove(ticket);
    }

    /// The last position an alert was fired for, if any.
    pub fn last_notified_position(&self, ticket: &TicketId) -> Option<u32> {
        self.last_notified.lock().unwrap().get(ticket).copied()
    }

    async fn ensure_permission(&self) -> Permission {
        let mut permission = self.permission.lock().await;
        if let Some(p) = *permission {
            return p;
        }
        let p = match self.sink.request_permission().await {
            Ok(p) => p,
            Err(e) => {
                debug!(error = %e, "permission request failed");
                Permission::Denied
            }
        };
        *permission = Some(p);
        p
    }
}

#[async_trait]
impl<S: AlertSink> PositionObserver for NotificationDispatcher<S> {
    async fn position_changed(&self, ticket: &Ticket) {
        self.observe(ticket).await;
    }

    fn tracking_ended(&self, ticket: &TicketId) {
        self.reset(ticket);
    }
}
