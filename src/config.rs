//! Polling cadences and transport limits.
//!
//! Each surface polls at its own cadence: the queue list at 5 seconds, an
//! open ticket detail view at 10 seconds, and the admin dashboard at 3
//! seconds. The cadences are independent knobs because the surfaces have
//! different freshness needs - an operator clearing a queue wants to see the
//! count move, while a rider three positions out does not need sub-5-second
//! precision.

use std::time::Duration;

/// Default interval between queue-list syncs (5 seconds).
const DEFAULT_LIST_POLL_SECS: u64 = 5;

/// Default interval between detail-view refreshes (10 seconds).
const DEFAULT_DETAIL_POLL_SECS: u64 = 10;

/// Default interval between admin dashboard refreshes (3 seconds).
const DEFAULT_ADMIN_POLL_SECS: u64 = 3;

/// Default transport timeout for one backend request (10 seconds).
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 10;

/// Cadence and timeout configuration for all polling loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Interval between active-ticket list syncs.
    ///
    /// Default: 5 seconds. Configure via `SMARTQUEUE_LIST_POLL_SECS`.
    pub list_interval: Duration,

    /// Interval between refreshes of an open ticket detail view.
    ///
    /// Default: 10 seconds. Configure via `SMARTQUEUE_DETAIL_POLL_SECS`.
    pub detail_interval: Duration,

    /// Interval between admin dashboard refreshes.
    ///
    /// Default: 3 seconds. Configure via `SMARTQUEUE_ADMIN_POLL_SECS`.
    pub admin_interval: Duration,

    /// Per-request transport timeout for the backend client.
    ///
    /// Default: 10 seconds.
    pub backend_timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PollConfig {
    /// Creates a `PollConfig` with default cadences.
    pub fn new() -> Self {
        PollConfig {
            list_interval: Duration::from_secs(DEFAULT_LIST_POLL_SECS),
            detail_interval: Duration::from_secs(DEFAULT_DETAIL_POLL_SECS),
            admin_interval: Duration::from_secs(DEFAULT_ADMIN_POLL_SECS),
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
        }
    }

    /// Creates a `PollConfig` from environment variables.
    ///
    /// Reads `SMARTQUEUE_LIST_POLL_SECS`, `SMARTQUEUE_DETAIL_POLL_SECS`, and
    /// `SMARTQUEUE_ADMIN_POLL_SECS`. Unset or unparsable values fall back to
    /// the defaults.
    pub fn from_env() -> Self {
        PollConfig {
            list_interval: env_secs("SMARTQUEUE_LIST_POLL_SECS", DEFAULT_LIST_POLL_SECS),
            detail_interval: env_secs("SMARTQUEUE_DETAIL_POLL_SECS", DEFAULT_DETAIL_POLL_SECS),
            admin_interval: env_secs("SMARTQUEUE_ADMIN_POLL_SECS", DEFAULT_ADMIN_POLL_SECS),
            ..Self::new()
        }
    }
}

fn env_secs(var: &str, default: u64) -> Duration {
    let secs = std::env::var(var)
        .ok()
        .and_then(|s| parse_secs(&s))
        .unwrap_or(default);
    Duration::from_secs(secs)
}

/// Parses a cadence value; zero is rejected so a misconfigured variable can
/// never produce a busy loop.
fn parse_secs(s: &str) -> Option<u64> {
    match s.trim().parse::<u64>() {
        Ok(0) => None,
        Ok(n) => Some(n),
        Err(_) => None,
    }
}
