//! In-memory store implementation
//!
//! Process-local backing for single-node use and tests. Same contract and
//! the same lazy expiration as the clustered store, but nothing is shared
//! with other members.

use super::entry::{now_millis, Entry};
use super::Store;
use crate::error::Result;
use async_trait::async_trait;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Type alias for our hash map with SipHasher
type StoreMap<T> = HashMap<String, Entry<T>, BuildHasherDefault<SipHasher13>>;

/// Process-local store
pub struct MemoryStore<T> {
    /// The main storage map
    store: Mutex<StoreMap<T>>,

    /// Counter for generated ids
    next_id: AtomicU64,

    /// Retention window (None = entries never expire)
    timeout: Option<Duration>,
}

impl<T> MemoryStore<T> {
    /// Create a store without expiration
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// Create a store whose entries expire after `timeout`
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        MemoryStore {
            store: Mutex::new(StoreMap::default()),
            next_id: AtomicU64::new(1),
            timeout: timeout.filter(|t| !t.is_zero()),
        }
    }

    /// Number of entries, including ones not yet swept
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cleanup expired entries
    /// Returns the number of entries removed
    pub fn cleanup_expired(&self) -> usize {
        let Some(timeout) = self.timeout else {
            return 0;
        };

        let now = now_millis();
        let mut store = self.lock();
        let before = store.len();
        store.retain(|id, entry| {
            let expired = entry.is_older_than(timeout, now);
            if expired {
                debug!("Removing object with id {} after {} ms", id, entry.age_at(now).as_millis());
            }
            !expired
        });
        before - store.len()
    }

    fn lock(&self) -> MutexGuard<'_, StoreMap<T>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Store<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn has_feature(&self, _feature: &str) -> bool {
        false
    }

    async fn store(&self, id: &str, data: T) -> Result<()> {
        debug!("Storing object with id: {}", id);
        self.lock().insert(id.to_string(), Entry::new(data));
        Ok(())
    }

    async fn store_generated(&self, data: T) -> Result<String> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        self.store(&id, data).await?;
        Ok(id)
    }

    async fn load(&self, id: &str) -> Result<Option<T>> {
        debug!("Loading/Removing object with id: {}", id);
        self.cleanup_expired();
        Ok(self.lock().remove(id).map(Entry::into_data))
    }

    async fn peek(&self, id: &str) -> Result<Option<T>> {
        debug!("Peeking object with id: {}", id);
        Ok(self.lock().get(id).map(|entry| entry.data().clone()))
    }
}
