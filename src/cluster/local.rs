//! In-process cluster
//!
//! Every member sharing one `LocalCluster` (usually through an `Arc`) sees
//! the same maps and generators. Maps are split into shards, each behind
//! its own lock, so writers to different keys rarely contend.

use super::{Cluster, DistributedMap, IdGenerator, ShardRouter};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use siphasher::sip::SipHasher13;
use std::any::Any;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::debug;

type ShardMap<V> = HashMap<String, V, BuildHasherDefault<SipHasher13>>;

/// In-process cluster handing out shared named maps and id generators
pub struct LocalCluster {
    num_shards: usize,
    maps: Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>,
    generators: Mutex<HashMap<String, Arc<LocalIdGenerator>>>,
}

impl LocalCluster {
    /// Create a cluster with one shard per CPU core (min 1, max 16)
    pub fn new() -> Self {
        Self::with_shards(num_cpus::get().clamp(1, 16))
    }

    /// Create a cluster whose maps use `num_shards` shards
    pub fn with_shards(num_shards: usize) -> Self {
        LocalCluster {
            num_shards: num_shards.max(1),
            maps: Mutex::new(HashMap::new()),
            generators: Mutex::new(HashMap::new()),
        }
    }

    /// Number of shards per map
    pub fn num_shards(&self) -> usize {
        self.num_shards
    }
}

impl Default for LocalCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl Cluster for LocalCluster {
    fn map<V>(&self, name: &str) -> Result<Arc<dyn DistributedMap<V>>>
    where
        V: Clone + Send + Sync + 'static,
    {
        let slot = lock(&self.maps)
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("Creating map '{}' with {} shards", name, self.num_shards);
                Arc::new(LocalMap::<V>::new(name, self.num_shards)) as Arc<dyn Any + Send + Sync>
            })
            .clone();

        match slot.downcast::<LocalMap<V>>() {
            Ok(map) => Ok(map as Arc<dyn DistributedMap<V>>),
            Err(_) => Err(StoreError::TypeMismatch { map: name.to_string() }),
        }
    }

    fn id_generator(&self, name: &str) -> Result<Arc<dyn IdGenerator>> {
        let generator = lock(&self.generators)
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(LocalIdGenerator::new()))
            .clone();
        Ok(generator as Arc<dyn IdGenerator>)
    }
}

/// Sharded in-process map
pub struct LocalMap<V> {
    name: String,
    router: ShardRouter,
    shards: Vec<RwLock<ShardMap<V>>>,
}

impl<V> LocalMap<V> {
    /// Create an empty map split into `num_shards` shards
    pub fn new(name: impl Into<String>, num_shards: usize) -> Self {
        let router = ShardRouter::new(num_shards);
        let shards = (0..router.num_shards())
            .map(|_| RwLock::new(ShardMap::default()))
            .collect();

        LocalMap {
            name: name.into(),
            router,
            shards,
        }
    }

    fn shard(&self, key: &str) -> &RwLock<ShardMap<V>> {
        &self.shards[self.router.route_key(key)]
    }

    /// Number of entries across all shards
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.read().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<V> DistributedMap<V> for LocalMap<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<V>> {
        let shard = self.shard(key).read().unwrap_or_else(PoisonError::into_inner);
        Ok(shard.get(key).cloned())
    }

    async fn put(&self, key: String, value: V) -> Result<Option<V>> {
        let mut shard = self.shard(&key).write().unwrap_or_else(PoisonError::into_inner);
        Ok(shard.insert(key, value))
    }

    async fn remove(&self, key: &str) -> Result<Option<V>> {
        let mut shard = self.shard(key).write().unwrap_or_else(PoisonError::into_inner);
        Ok(shard.remove(key))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for shard in &self.shards {
            let shard = shard.read().unwrap_or_else(PoisonError::into_inner);
            keys.extend(shard.keys().cloned());
        }
        Ok(keys)
    }
}

/// In-process id generator backed by an atomic counter
#[derive(Debug)]
pub struct LocalIdGenerator {
    next: AtomicU64,
}

impl LocalIdGenerator {
    /// Create a generator whose first id is 1
    pub fn new() -> Self {
        LocalIdGenerator {
            next: AtomicU64::new(1),
        }
    }
}

impl Default for LocalIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdGenerator for LocalIdGenerator {
    async fn new_id(&self) -> Result<u64> {
        Ok(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
