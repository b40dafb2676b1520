//! Clustered store implementation
//!
//! Every operation goes straight to the cluster map; nothing is cached
//! locally, so all members addressing the same map name see the same data.

use super::entry::{now_millis, Entry};
use super::{Store, CLUSTERED};
use crate::cluster::{DistributedMap, IdGenerator};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Store backed by a cluster-wide map and id generator
pub struct ClusteredStore<T: Send + 'static> {
    /// Logical name, as passed to the factory
    name: String,

    /// Backing map holding one entry per id
    datas: Arc<dyn DistributedMap<Entry<T>>>,

    /// Generator for ids the caller did not supply
    id_generator: Arc<dyn IdGenerator>,

    /// Retention window (None = entries never expire)
    timeout: Option<Duration>,
}

impl<T: Send + 'static> ClusteredStore<T> {
    /// Create a store over the given collaborators
    pub fn new(
        name: impl Into<String>,
        datas: Arc<dyn DistributedMap<Entry<T>>>,
        id_generator: Arc<dyn IdGenerator>,
        timeout: Option<Duration>,
    ) -> Self {
        ClusteredStore {
            name: name.into(),
            datas,
            id_generator,
            timeout: timeout.filter(|t| !t.is_zero()),
        }
    }

    /// Logical store name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the backing map in the cluster
    pub fn map_name(&self) -> &str {
        self.datas.name()
    }

    /// Retention window, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Remove every entry older than the retention window
    ///
    /// Returns the number of entries this call removed. Keys that vanish
    /// mid-sweep (consumed or evicted by another member) are skipped.
    /// Without a timeout this is a no-op.
    pub async fn evict(&self) -> Result<usize> {
        let Some(timeout) = self.timeout else {
            return Ok(0);
        };

        let now = now_millis();
        let mut removed = 0;

        for key in self.datas.keys().await? {
            let Some(entry) = self.datas.get(&key).await? else {
                continue;
            };

            if entry.is_older_than(timeout, now) {
                let age = entry.age_at(now);
                if self.datas.remove(&key).await?.is_some() {
                    debug!(
                        "Removing object with id {} from store '{}' after {} ms",
                        key,
                        self.name,
                        age.as_millis()
                    );
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }
}

#[async_trait]
impl<T> Store<T> for ClusteredStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn has_feature(&self, feature: &str) -> bool {
        feature == CLUSTERED
    }

    async fn store(&self, id: &str, data: T) -> Result<()> {
        debug!("Storing object with id: {}", id);
        self.datas.put(id.to_string(), Entry::new(data)).await?;
        Ok(())
    }

    async fn store_generated(&self, data: T) -> Result<String> {
        let id = self.id_generator.new_id().await?.to_string();
        self.store(&id, data).await?;
        Ok(id)
    }

    async fn load(&self, id: &str) -> Result<Option<T>> {
        debug!("Loading/Removing object with id: {}", id);
        if self.timeout.is_some() {
            self.evict().await?;
        }
        Ok(self.datas.remove(id).await?.map(Entry::into_data))
    }

    async fn peek(&self, id: &str) -> Result<Option<T>> {
        debug!("Peeking object with id: {}", id);
        Ok(self.datas.get(id).await?.map(Entry::into_data))
    }
}
