//! Cluster collaborator module
//!
//! Stores never talk to the network themselves. They are handed named,
//! cluster-wide structures by a [`Cluster`]: key/value maps and id
//! generators. Two handles with the same name address the same structure,
//! no matter which member obtained them.
//!
//! [`LocalCluster`] is an in-process implementation for tests and
//! single-node deployments.

mod local;
mod router;

pub use local::{LocalCluster, LocalIdGenerator, LocalMap};
pub use router::ShardRouter;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A cluster-wide map from string keys to values
///
/// Every operation is atomic per key. Removing an absent key is not an
/// error.
#[async_trait]
pub trait DistributedMap<V: Send + 'static>: Send + Sync {
    /// Name of the map within the cluster
    fn name(&self) -> &str;

    /// Get the value under `key`
    async fn get(&self, key: &str) -> Result<Option<V>>;

    /// Put a value, returning the previous one
    async fn put(&self, key: String, value: V) -> Result<Option<V>>;

    /// Remove a value, returning it if it was present
    async fn remove(&self, key: &str) -> Result<Option<V>>;

    /// Snapshot of the keys currently in the map
    async fn keys(&self) -> Result<Vec<String>>;
}

/// A cluster-wide generator of unique, increasing ids
#[async_trait]
pub trait IdGenerator: Send + Sync {
    /// Next id; never handed out twice for the same generator name
    async fn new_id(&self) -> Result<u64>;
}

/// Source of named distributed structures
pub trait Cluster: Send + Sync + 'static {
    /// Handle to the map called `name`
    fn map<V>(&self, name: &str) -> Result<Arc<dyn DistributedMap<V>>>
    where
        V: Clone + Send + Sync + 'static;

    /// Handle to the id generator called `name`
    fn id_generator(&self, name: &str) -> Result<Arc<dyn IdGenerator>>;
}

/// Build the cluster-wide name `"<prefix>.<name>"`
pub fn qualified_name(prefix: &str, name: &str) -> String {
    format!("{}.{}", prefix, name)
}
