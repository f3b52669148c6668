//! Local ticket cache.
//!
//! The cache holds the last successfully synchronized active-ticket set per
//! user so that a backend outage never blanks the UI when a prior snapshot
//! exists. Entries are wholesale-replaced on every successful sync - never
//! field-merged - because merging partial fields from two sources risks
//! presenting a position that was never actually returned together with the
//! status it is shown next to.
//!
//! Only [`TicketSynchronizer`](crate::sync::TicketSynchronizer) writes the
//! cache; every other component reads ticket state through the synchronizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Ticket, UserId};

pub mod file;
pub mod memory;

pub use file::JsonFileCache;
pub use memory::MemoryCache;

/// Errors from the persistence seam.
#[derive(Debug, Error)]
pub enum CacheError {
    /// IO failure reading or writing the backing store.
    #[error("cache IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored entry could not be decoded.
    #[error("corrupt cache entry: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// One serialized snapshot of a user's active-ticket set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalCacheEntry {
    pub user_id: UserId,
    pub tickets: Vec<Ticket>,
    pub saved_at: DateTime<Utc>,
}

impl LocalCacheEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(user_id: UserId, tickets: Vec<Ticket>) -> Self {
        LocalCacheEntry {
            user_id,
            tickets,
            saved_at: Utc::now(),
        }
    }
}

/// Key-value persistence for the active-ticket snapshot.
///
/// Implementations are expected to be cheap: the synchronizer calls `store`
/// on every successful sync.
pub trait TicketCache: Send + Sync {
    /// Loads the last stored snapshot for a user, if any.
    fn load(&self, user: &UserId) -> Result<Option<LocalCacheEntry>>;

    /// Replaces the stored snapshot for the entry's user.
    fn store(&self, entry: &LocalCacheEntry) -> Result<()>;
}

impl<T: TicketCache + ?Sized> TicketCache for std::sync::Arc<T> {
    fn load(&self, user: &UserId) -> Result<Option<LocalCacheEntry>> {
        (**self).load(user)
    }

    fn store(&self, entry: &LocalCacheEntry) -> Result<()> {
        (**self).store(entry)
    }
}
