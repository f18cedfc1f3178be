//! Process-local cache. Lost on restart.

use async_trait::async_trait;
use common::StatusRecord;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::StatusCache;

/// Longest lifetime an entry can get, whatever TTL the caller asks for.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

struct CacheEntry {
    value: Vec<StatusRecord>,
    exp: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.exp
    }
}

#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        before - entries.len()
    }

    /// Physically stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StatusCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<StatusRecord>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(e) if !e.is_expired(now) => return Some(e.value.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).map_or(false, |e| e.is_expired(now)) {
            entries.remove(key);
            debug!(key = %key, "Expired cache entry removed");
        }
        None
    }

    async fn set(&self, key: &str, records: &[StatusRecord], ttl: Duration) {
        let now = Instant::now();
        let exp = now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now);
        let entry = CacheEntry { value: records.to_vec(), exp };
        self.entries.write().await.insert(key.to_string(), entry);
    }
}
