//! HTTP implementation of [`QueueBackend`].
//!
//! Paths follow the backend's REST surface:
//!
//! - `GET  /queues` and `GET /queues/{queueId}`
//! - `POST /queues/{queueId}/join`
//! - `GET  /queues/{queueId}/status?ticketId=...`
//! - `GET  /queues/{queueId}/eta?ticketId=...&position=...`
//! - `GET  /queues/tickets/{userId}`
//! - `POST /queues/{queueId}/next`
//! - `POST /queues`, `PUT /queues/{queueId}`, `DELETE /queues/{queueId}`
//!
//! Queue list payloads are sparse in practice (older backends omit
//! `description`, `isActive`, or report `queueName` instead of `name`), so
//! list responses are decoded through a lenient wire struct and normalized
//! here rather than forcing every deployment to upgrade in lockstep.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{EtaSnapshot, QueueConfig, QueueId, QueueSummary, Ticket, TicketId, UserId};

use super::error::{BackendError, Result};
use super::QueueBackend;

/// Default transport timeout. Polling cadences are all longer than this, so a
/// hung request cannot stack up behind the next tick indefinitely.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A [`QueueBackend`] speaking JSON over HTTP via `reqwest`.
pub struct HttpQueueBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpQueueBackend {
    /// Creates a client for the given base URL (e.g. `https://host/api`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom transport timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::network(format!("failed to build HTTP client: {e}")))?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(HttpQueueBackend { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decodes a response, mapping HTTP 409 to `Conflict` and other
    /// non-success statuses to `Api`.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            if status.as_u16() == 409 {
                return Err(BackendError::Conflict { message });
            }
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }
        resp.json().await.map_err(|e| BackendError::Api {
            status: status.as_u16(),
            message: format!("invalid response body: {e}"),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(path, "GET");
        let resp = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(BackendError::from_transport)?;
        Self::decode(resp).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        debug!(path, "POST");
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(BackendError::from_transport)?;
        Self::decode(resp).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinRequest<'a> {
    user_id: &'a UserId,
}

#[derive(Serialize)]
struct AdvanceRequest {
    count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdvanceResponse {
    processed_count: u32,
}

/// Lenient wire shape for queue summaries; see module docs.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueueSummaryWire {
    queue_id: QueueId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    queue_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    waiting_count: Option<u32>,
    #[serde(default)]
    max_capacity: Option<u32>,
    #[serde(default)]
    average_service_time_minutes: Option<f64>,
}

impl QueueSummaryWire {
    fn normalize(self) -> QueueSummary {
        QueueSummary {
            queue_id: self.queue_id,
            name: self.queue_name.or(self.name).unwrap_or_default(),
            description: self
                .description
                .unwrap_or_else(|| "No description".to_string()),
            is_active: self.is_active.unwrap_or(true),
            waiting_count: self.waiting_count.unwrap_or(0),
            max_capacity: self.max_capacity.unwrap_or(100),
            average_service_time_minutes: self.average_service_time_minutes.unwrap_or(5.0),
        }
    }
}

#[async_trait]
impl QueueBackend for HttpQueueBackend {
    async fn queues(&self) -> Result<Vec<QueueSummary>> {
        let wire: Vec<QueueSummaryWire> = self.get_json("/queues", &[]).await?;
        Ok(wire.into_iter().map(QueueSummaryWire::normalize).collect())
    }

    async fn queue(&self, queue: &QueueId) -> Result<QueueSummary> {
        let wire: QueueSummaryWire = self
            .get_json(&format!("/queues/{}", queue.as_str()), &[])
            .await?;
        Ok(wire.normalize())
    }

    async fn join_queue(&self, queue: &QueueId, user: &UserId) -> Result<Ticket> {
        self.post_json(
            &format!("/queues/{}/join", queue.as_str()),
            &JoinRequest { user_id: user },
        )
        .await
    }

    async fn queue_status(&self, queue: &QueueId, ticket: &TicketId) -> Result<Ticket> {
        self.get_json(
            &format!("/queues/{}/status", queue.as_str()),
            &[("ticketId", ticket.as_str().to_string())],
        )
        .await
    }

    async fn eta(
        &self,
        queue: &QueueId,
        ticket: &TicketId,
        position: u32,
    ) -> Result<EtaSnapshot> {
        self.get_json(
            &format!("/queues/{}/eta", queue.as_str()),
            &[
                ("ticketId", ticket.as_str().to_string()),
                ("position", position.to_string()),
            ],
        )
        .await
    }

    async fn user_tickets(&self, user: &UserId) -> Result<Vec<Ticket>> {
        self.get_json(&format!("/queues/tickets/{}", user.as_str()), &[])
            .await
    }

    async fn advance_queue(&self, queue: &QueueId, count: u32) -> Result<u32> {
        let resp: AdvanceResponse = self
            .post_json(
                &format!("/queues/{}/next", queue.as_str()),
                &AdvanceRequest { count },
            )
            .await?;
        Ok(resp.processed_count)
    }

    async fn create_queue(&self, config: &QueueConfig) -> Result<QueueSummary> {
        let wire: QueueSummaryWire = self.post_json("/queues", config).await?;
        Ok(wire.normalize())
    }

    async fn update_queue(&self, queue: &QueueId, config: &QueueConfig) -> Result<QueueSummary> {
        debug!(queue = %queue, "PUT /queues");
        let resp = self
            .http
            .put(self.url(&format!("/queues/{}", queue.as_str())))
            .json(config)
            .send()
            .await
            .map_err(BackendError::from_transport)?;
        let wire: QueueSummaryWire = Self::decode(resp).await?;
        Ok(wire.normalize())
    }

    async fn delete_queue(&self, queue: &QueueId) -> Result<()> {
        debug!(queue = %queue, "DELETE /queues");
        let resp = self
            .http
            .delete(self.url(&format!("/queues/{}", queue.as_str())))
            .send()
            .await
            .map_err(BackendError::from_transport)?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let backend = HttpQueueBackend::new("http://localhost:8080/api/").unwrap();
        assert_eq!(backend.url("/queues"), "http://localhost:8080/api/queues");
    }

    #[test]
    fn sparse_summary_gets_defaults() {
        let wire: QueueSummaryWire = serde_json::from_str(r#"{"queueId": "q-1"}"#).unwrap();
        let summary = wire.normalize();
        assert_eq!(summary.description, "No description");
        assert!(summary.is_active);
        assert_eq!(summary.waiting_count, 0);
        assert_eq!(summary.max_capacity, 100);
        assert_eq!(summary.average_service_time_minutes, 5.0);
    }

    #[test]
    fn queue_name_alias_wins_over_name() {
        let wire: QueueSummaryWire = serde_json::from_str(
            r#"{"queueId": "q-1", "queueName": "Pharmacy", "name": "legacy"}"#,
        )
        .unwrap();
        assert_eq!(wire.normalize().name, "Pharmacy");
    }

    #[test]
    fn full_summary_passes_through() {
        let wire: QueueSummaryWire = serde_json::from_str(
            r#"{
                "queueId": "q-2",
                "name": "Deli",
                "description": "Cold cuts",
                "isActive": false,
                "waitingCount": 12,
                "maxCapacity": 40,
                "averageServiceTimeMinutes": 2.5
            }"#,
        )
        .unwrap();
        let summary = wire.normalize();
        assert_eq!(summary.name, "Deli");
        assert!(!summary.is_active);
        assert_eq!(summary.waiting_count, 12);
        assert_eq!(summary.max_capacity, 40);
        assert_eq!(summary.average_service_time_minutes, 2.5);
    }

    #[test]
    fn advance_response_parses_processed_count() {
        let resp: AdvanceResponse = serde_json::from_str(r#"{"processedCount": 3}"#).unwrap();
        assert_eq!(resp.processed_count, 3);
    }
}
