//! In-memory cache implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::UserId;

use super::{LocalCacheEntry, Result, TicketCache};

/// A [`TicketCache`] backed by a process-local map.
///
/// Useful in tests and in hosts that provide no durable storage; snapshots do
/// not survive a restart.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<UserId, LocalCacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TicketCache for MemoryCache {
    fn load(&self, user: &UserId) -> Result<Option<LocalCacheEntry>> {
        Ok(self.entries.lock().unwrap().get(user).cloned())
    }

    fn store(&self, entry: &LocalCacheEntry) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.user_id.clone(), entry.clone());
        Ok(())
    }
}
