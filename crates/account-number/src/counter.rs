//! Atomic daily counter abstraction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::Result;

/// A counter store offering increment-and-expire as one atomic unit.
///
/// Implementations must never let concurrent issuers observe a lost
/// increment, and must not keep the count in process memory when several
/// issuer instances share a date key.
#[async_trait]
pub trait AtomicCounter: Send + Sync {
    /// Increments `key` by one, (re)sets its expiry to `expire_at`, and
    /// returns the incremented value.
    async fn incr_with_expiry(&self, key: &str, expire_at: DateTime<Utc>) -> Result<i64>;
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: i64,
    expire_at: DateTime<Utc>,
}

/// Single-process counter for tests and local runs.
///
/// Expiry is evaluated lazily against the wall clock, so a key whose expiry
/// is already past restarts from 1 on the next increment, like a key that a
/// real store has evicted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCounter {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl InMemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live value of a key, if any.
    pub async fn get(&self, key: &str) -> Option<i64> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|e| e.expire_at > Utc::now())
            .map(|e| e.value)
    }
}

#[async_trait]
impl AtomicCounter for InMemoryCounter {
    async fn incr_with_expiry(&self, key: &str, expire_at: DateTime<Utc>) -> Result<i64> {
        let now = Utc::now();
        let mut entries = self.entries.lock().await;

        let value = match entries.get(key) {
            Some(entry) if entry.expire_at > now => entry.value + 1,
            _ => 1,
        };
        entries.insert(key.to_string(), Entry { value, expire_at });
        Ok(value)
    }
}
