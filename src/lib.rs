//! Clustore - a clustered object store
//!
//! Payloads are stored under an id (supplied or generated) and read back
//! either once (`load`, which removes the entry) or repeatedly (`peek`).
//! Stores configured with a timeout drop stale entries lazily on `load`.
//!
//! - `store`: the `Store` contract, entries and the store backings
//! - `cluster`: seams to the distributed map and id generator, plus an
//!   in-process cluster
//! - `factory`: one store per logical name, with a shared default timeout

pub mod cluster;
pub mod config;
pub mod error;
pub mod factory;
pub mod store;

/// Re-export commonly used types
pub use cluster::{Cluster, DistributedMap, IdGenerator, LocalCluster};
pub use config::{ttl_from_millis, FactoryConfig, STORE_PREFIX};
pub use error::{Result, StoreError};
pub use factory::{StoreFactory, StoreRegistration};
pub use store::{ClusteredStore, Entry, MemoryStore, Store, CLUSTERED, PERSISTENT, TRANSACTIONAL};
