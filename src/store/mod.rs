//! Store module
//!
//! A store keeps payloads under string ids. `load` consumes an entry,
//! `peek` leaves it in place. Stores with a TTL drop stale entries lazily,
//! during `load`; there is no background sweeper.

mod clustered;
mod entry;
mod memory;

pub use clustered::ClusteredStore;
pub use entry::{now_millis, Entry};
pub use memory::MemoryStore;

use crate::error::Result;
use async_trait::async_trait;

/// Feature tag: the store is backed by a cluster-replicated map
pub const CLUSTERED: &str = "clustered";

/// Feature tag: the store survives process restarts
pub const PERSISTENT: &str = "persistent";

/// Feature tag: the store takes part in transactions
pub const TRANSACTIONAL: &str = "transactional";

/// Common contract for every store backing
///
/// Callers hold `Arc<dyn Store<T>>` and never care which backing sits
/// underneath.
#[async_trait]
pub trait Store<T: Send + 'static>: Send + Sync {
    /// Check if the store provides the given feature
    fn has_feature(&self, feature: &str) -> bool;

    /// Put `data` under `id`, overwriting whatever was there
    ///
    /// The store does not check for an existing entry. Avoiding id
    /// collisions is the caller's job.
    async fn store(&self, id: &str, data: T) -> Result<()>;

    /// Put `data` under a freshly generated id and return that id
    async fn store_generated(&self, data: T) -> Result<String>;

    /// Remove and return the payload stored under `id`
    async fn load(&self, id: &str) -> Result<Option<T>>;

    /// Return the payload stored under `id` without removing it
    async fn peek(&self, id: &str) -> Result<Option<T>>;
}
