//! Key routing logic for sharded maps
//!
//! Routes keys to shards using SipHash-1-3.

use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};

/// Routes keys to shards
#[derive(Debug, Clone)]
pub struct ShardRouter {
    num_shards: usize,
}

impl ShardRouter {
    /// Create a new shard router (at least one shard)
    pub fn new(num_shards: usize) -> Self {
        ShardRouter {
            num_shards: num_shards.max(1),
        }
    }

    /// Route a key to a shard index
    pub fn route_key(&self, key: &str) -> usize {
        (self.hash_key(key) % self.num_shards as u64) as usize
    }

    fn hash_key(&self, key: &str) -> u64 {
        let mut hasher = SipHasher13::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    /// Get the number of shards
    pub fn num_shards(&self) -> usize {
        self.num_shards
    }
}
