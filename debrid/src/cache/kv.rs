//! Cache over an external key-value store with native TTL.
//!
//! Values are stored as a JSON envelope `{"value": [...], "exp": <epoch ms>}`.
//! The native TTL only bounds storage; freshness is decided by `exp` on read.

use async_trait::async_trait;
use chrono::Utc;
use common::StatusRecord;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{CacheError, StatusCache};

/// Minimal key-value interface a backend has to provide.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn put(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    value: Vec<StatusRecord>,
    exp: i64,
}

impl Envelope {
    fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.exp
    }
}

pub struct KvCache<S> {
    store: S,
}

impl<S: KvStore> KvCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn load(&self, key: &str) -> Result<Option<Vec<StatusRecord>>, CacheError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        let envelope: Envelope = match serde_json::from_str(&raw) {
            Ok(e) => e,
            Err(e) => {
                warn!(key = %key, "Dropping undecodable cache entry: {}", e);
                self.store.delete(key).await?;
                return Ok(None);
            }
        };
        if envelope.is_expired(Utc::now().timestamp_millis()) {
            debug!(key = %key, "Expired cache entry removed");
            self.store.delete(key).await?;
            return Ok(None);
        }
        Ok(Some(envelope.value))
    }

    async fn store_records(
        &self,
        key: &str,
        records: &[StatusRecord],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let envelope = Envelope {
            value: records.to_vec(),
            exp: Utc::now().timestamp_millis().saturating_add(ttl_ms),
        };
        let raw = serde_json::to_string(&envelope)?;
        // Stores reject a zero TTL.
        let ttl_secs = ttl.as_secs().max(1);
        self.store.put(key, raw, ttl_secs).await
    }
}

#[async_trait]
impl<S: KvStore> StatusCache for KvCache<S> {
    async fn get(&self, key: &str) -> Option<Vec<StatusRecord>> {
        match self.load(key).await {
            Ok(v) => v,
            Err(e) => {
                warn!(key = %key, "Cache read failed, treating as miss: {}", e);
                None
            }
        }
    }

    async fn set(&self, key: &str, records: &[StatusRecord], ttl: Duration) {
        if let Err(e) = self.store_records(key, records, ttl).await {
            warn!(key = %key, "Cache write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        data: Mutex<HashMap<String, (String, u64)>>,
        down: AtomicBool,
    }

    impl FakeStore {
        fn check(&self) -> Result<(), CacheError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(CacheError::Unavailable("fake store down".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl KvStore for FakeStore {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            self.check()?;
            Ok(self.data.lock().unwrap().get(key).map(|(v, _)| v.clone()))
        }

        async fn put(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
            self.check()?;
            self.data.lock().unwrap().insert(key.to_string(), (value, ttl_secs));
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), CacheError> {
            self.check()?;
            self.data.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn records() -> Vec<StatusRecord> {
        vec![StatusRecord::inactive("Premiumize", Some("123456".into()))]
    }

    #[tokio::test]
    async fn test_roundtrip_writes_envelope_with_native_ttl() {
        let cache = KvCache::new(FakeStore::default());
        cache.set("k", &records(), Duration::from_secs(45 * 60)).await;

        assert_eq!(cache.get("k").await, Some(records()));

        let (raw, ttl) = cache.store().data.lock().unwrap().get("k").cloned().unwrap();
        assert_eq!(ttl, 2700);
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json["exp"].as_i64().unwrap() > Utc::now().timestamp_millis());
        assert_eq!(json["value"][0]["name"], "Premiumize");
    }

    #[tokio::test]
    async fn test_stale_envelope_is_a_miss_and_deleted() {
        let store = FakeStore::default();
        let stale = Envelope { value: records(), exp: Utc::now().timestamp_millis() - 1_000 };
        store.put("k", serde_json::to_string(&stale).unwrap(), 60).await.unwrap();

        let cache = KvCache::new(store);
        assert_eq!(cache.get("k").await, None);
        assert!(cache.store().data.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_garbage_entry_is_a_miss() {
        let store = FakeStore::default();
        store.put("k", "{not json".into(), 60).await.unwrap();

        let cache = KvCache::new(store);
        assert_eq!(cache.get("k").await, None);
        assert!(cache.store().data.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_is_absorbed() {
        let cache = KvCache::new(FakeStore::default());
        cache.store().down.store(true, Ordering::SeqCst);

        cache.set("k", &records(), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_clamped() {
        let cache = KvCache::new(FakeStore::default());
        cache.set("k", &records(), Duration::from_millis(200)).await;
        let ttl = cache.store().data.lock().unwrap().get("k").unwrap().1;
        assert_eq!(ttl, 1);
    }
}
