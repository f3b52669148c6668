//! Backend error types.
//!
//! The taxonomy matters for how callers degrade:
//!
//! - **Network** errors (transport failure, timeout, backend unreachable) are
//!   non-fatal for reads: the synchronizer falls back to its cached snapshot.
//! - **Conflict** (duplicate join, HTTP 409) is surfaced to the user with no
//!   retry and no cache mutation.
//! - **Api** covers everything else the backend rejects; scheduled polling is
//!   the only retry mechanism for reads, and writes are never retried
//!   automatically.

use thiserror::Error;

/// An error from the queue backend, categorized for degradation decisions.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure: the backend could not be reached or did not
    /// answer in time.
    #[error("backend unreachable: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The backend rejected the request as conflicting with existing state
    /// (e.g., the user already holds a waiting ticket in this queue).
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Any other backend rejection, with the HTTP status if available.
    #[error("backend error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
}

impl BackendError {
    /// Creates a network error without a transport source.
    pub fn network(message: impl Into<String>) -> Self {
        BackendError::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        BackendError::Conflict {
            message: message.into(),
        }
    }

    /// Returns true if this error means the backend was unreachable, so a
    /// read may degrade to cached data.
    pub fn is_network(&self) -> bool {
        matches!(self, BackendError::Network { .. })
    }

    /// Returns true if this error is a duplicate-join style conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, BackendError::Conflict { .. })
    }

    /// Categorizes a reqwest error.
    ///
    /// Errors without a response (connect failures, timeouts, DNS) are
    /// `Network`; responses with a status are `Conflict` for 409 and `Api`
    /// otherwise.
    pub fn from_transport(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status.as_u16() == 409 => BackendError::Conflict {
                message: err.to_string(),
            },
            Some(status) => BackendError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => BackendError::Network {
                message: err.to_string(),
                source: Some(err),
            },
        }
    }
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
