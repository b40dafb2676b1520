//! Store factory module
//!
//! Hands out one [`ClusteredStore`] per logical name and keeps a
//! cluster-wide registry of which stores exist and with which timeout.

use crate::cluster::{qualified_name, Cluster, DistributedMap};
use crate::config::{ttl_to_millis, FactoryConfig};
use crate::error::Result;
use crate::store::{ClusteredStore, Entry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// A store's record in the cluster-wide registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRegistration {
    /// Logical store name
    pub name: String,

    /// Retention window in milliseconds (None = no eviction)
    pub timeout_ms: Option<u64>,
}

impl StoreRegistration {
    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Registry of stores, keyed by logical name
///
/// Owned by the host application. `open` and `close` are serialized
/// within the process; the registry itself lives in the cluster.
pub struct StoreFactory<C: Cluster, T: Send + 'static> {
    cluster: Arc<C>,
    prefix: String,

    /// Default timeout in milliseconds for stores created from now on (0 = none)
    timeout_ms: AtomicU64,

    registry: Arc<dyn DistributedMap<StoreRegistration>>,
    stores: Mutex<HashMap<String, Arc<ClusteredStore<T>>>>,
}

impl<C, T> StoreFactory<C, T>
where
    C: Cluster,
    T: Clone + Send + Sync + 'static,
{
    /// Create a factory over `cluster`
    ///
    /// Fails if the registry map cannot be obtained from the cluster.
    pub fn new(cluster: Arc<C>, config: FactoryConfig) -> Result<Self> {
        let registry = cluster.map::<StoreRegistration>(&config.prefix)?;
        let factory = StoreFactory {
            cluster,
            prefix: config.prefix.clone(),
            timeout_ms: AtomicU64::new(0),
            registry,
            stores: Mutex::new(HashMap::new()),
        };
        factory.set_timeout(config.timeout());
        Ok(factory)
    }

    /// Open the store called `name`, creating it on first use
    ///
    /// Repeated calls in one process return the same `Arc`. A store already
    /// registered by another member keeps its registered timeout; a new
    /// one gets the factory's current default.
    ///
    /// Two members opening a brand-new name at the same moment can both
    /// miss the registry and both register. The last registration wins.
    /// Both handles still address the same named map and id generator, so
    /// no data is split.
    pub async fn open(&self, name: &str) -> Result<Arc<ClusteredStore<T>>> {
        let mut stores = self.stores.lock().await;
        if let Some(store) = stores.get(name) {
            return Ok(store.clone());
        }

        let store_name = qualified_name(&self.prefix, name);
        let datas = self.cluster.map::<Entry<T>>(&store_name)?;
        let id_generator = self.cluster.id_generator(&store_name)?;

        let registration = match self.registry.get(name).await? {
            Some(existing) => {
                debug!("Store '{}' already registered in the cluster", name);
                existing
            }
            None => {
                let registration = StoreRegistration {
                    name: name.to_string(),
                    timeout_ms: self.timeout().map(ttl_to_millis),
                };
                self.registry
                    .put(name.to_string(), registration.clone())
                    .await?;
                registration
            }
        };

        let store = Arc::new(ClusteredStore::new(
            name,
            datas,
            id_generator,
            registration.timeout(),
        ));

        info!(
            "Opened store '{}' on map '{}' (timeout: {:?})",
            name,
            store_name,
            store.timeout()
        );
        stores.insert(name.to_string(), store.clone());
        Ok(store)
    }

    /// Close the store called `name`
    ///
    /// Drops the local handle and the cluster registration. Stored entries
    /// stay in the backing map. Returns true if the store was open or
    /// registered.
    pub async fn close(&self, name: &str) -> Result<bool> {
        let mut stores = self.stores.lock().await;
        let local = stores.remove(name).is_some();
        let registered = self.registry.remove(name).await?.is_some();

        if local || registered {
            info!("Closed store '{}'", name);
        }
        Ok(local || registered)
    }

    /// Set the default timeout for stores created after this call
    ///
    /// Stores that are already open, or registered elsewhere in the
    /// cluster, keep their timeout. Sub-millisecond values round up to 1 ms.
    pub fn set_timeout(&self, timeout: Option<Duration>) {
        let millis = timeout.map(ttl_to_millis).unwrap_or(0);
        self.timeout_ms.store(millis, Ordering::Relaxed);
    }

    /// Current default timeout
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_ms.load(Ordering::Relaxed) {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }

    /// Naming prefix used for the registry and store maps
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Names of the stores open in this process
    pub async fn open_stores(&self) -> Vec<String> {
        self.stores.lock().await.keys().cloned().collect()
    }
}
