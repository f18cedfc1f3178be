//! Result cache: aggregated status lists keyed by config fingerprint.
//!
//! Two interchangeable backends share one lazy-expiry contract: an entry
//! past its expiry is invisible to `get` (and removed by it) even if the
//! backend has not physically evicted it yet.

use async_trait::async_trait;
use common::StatusRecord;
use std::time::Duration;

pub mod kv;
pub mod memory;
pub mod redis;

pub use self::kv::{KvCache, KvStore};
pub use self::memory::MemoryCache;
pub use self::redis::RedisStore;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("cache entry codec: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Capability the aggregator depends on. Backend failures are absorbed:
/// a failing `get` is a miss and a failing `set` is a no-op.
#[async_trait]
pub trait StatusCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<StatusRecord>>;

    async fn set(&self, key: &str, records: &[StatusRecord], ttl: Duration);
}
