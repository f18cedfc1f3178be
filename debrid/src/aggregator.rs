//! Status service: fan out to enabled providers, cache the list.
//!
//! One task per enabled provider runs concurrently; results are collected
//! in the fixed provider order regardless of completion order. Provider
//! failures are already absorbed into degraded records by the adapters, so
//! the only aggregate failure is a task that died.

use chrono::Utc;
use common::{ResolvedConfig, StatusRecord};
use std::sync::Arc;
use tracing::{debug, info};

use crate::adapters::{AdapterRegistry, ProbeRequest};
use crate::cache::StatusCache;
use crate::demo;
use crate::fingerprint::Fingerprint;

#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("status task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Aggregated records plus the questions host profiles ask about them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusReport {
    pub records: Vec<StatusRecord>,
}

impl StatusReport {
    /// Any record with a known premium state or a username.
    pub fn has_data(&self) -> bool {
        self.records.iter().any(StatusRecord::is_informative)
    }

    pub fn informative(&self) -> impl Iterator<Item = &StatusRecord> {
        self.records.iter().filter(|r| r.is_informative())
    }

    /// Records worth a card at all.
    pub fn renderable(&self) -> impl Iterator<Item = &StatusRecord> {
        self.records.iter().filter(|r| !r.is_blank())
    }
}

#[derive(Clone)]
pub struct StatusService {
    registry: AdapterRegistry,
    cache: Arc<dyn StatusCache>,
}

impl StatusService {
    pub fn new(registry: AdapterRegistry, cache: Arc<dyn StatusCache>) -> Self {
        Self { registry, cache }
    }

    /// Status list for a config, from cache when fresh.
    pub async fn fetch(&self, cfg: &ResolvedConfig) -> Result<Vec<StatusRecord>, AggregateError> {
        if cfg.demo.is_off() && !cfg.has_enabled() {
            debug!("No providers enabled");
            return Ok(Vec::new());
        }

        let fingerprint = Fingerprint::from_config(cfg);
        let key = fingerprint.key();
        if let Some(hit) = self.cache.get(&key).await {
            debug!(config = %fingerprint.describe(), "Cache hit");
            return Ok(hit);
        }

        let records = if cfg.demo.is_off() {
            self.probe_all(cfg).await?
        } else {
            demo::records(cfg.demo, Utc::now())
        };

        info!(
            config = %fingerprint.describe(),
            providers = records.len(),
            "Status refreshed"
        );
        self.cache.set(&key, &records, cfg.cache_ttl()).await;
        Ok(records)
    }

    pub async fn report(&self, cfg: &ResolvedConfig) -> Result<StatusReport, AggregateError> {
        Ok(StatusReport { records: self.fetch(cfg).await? })
    }

    async fn probe_all(&self, cfg: &ResolvedConfig) -> Result<Vec<StatusRecord>, AggregateError> {
        let mut handles = Vec::with_capacity(cfg.enabled.len());
        for &provider in &cfg.enabled {
            let adapter = self.registry.get(provider);
            let req = ProbeRequest::from_config(cfg, provider);
            handles.push(tokio::spawn(async move {
                match adapter {
                    Some(adapter) => adapter.status(req.as_ref()).await,
                    None => StatusRecord::unknown(provider.label(), "unsupported provider"),
                }
            }));
        }

        let mut records = Vec::with_capacity(handles.len());
        for handle in handles {
            records.push(handle.await?);
        }
        Ok(records)
    }
}
