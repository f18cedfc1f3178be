//! Universal debrid adapter trait: provider-agnostic status probing.
//!
//! Every upstream service (Real-Debrid, AllDebrid, ...) implements this
//! trait. The aggregator calls adapters; adapters never see each other or
//! the cache.

use async_trait::async_trait;
use common::{AuthVariant, Provider, ResolvedConfig, StatusRecord};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub mod alldebrid;
pub mod debridlink;
pub mod premiumize;
pub mod realdebrid;
pub mod torbox;

pub const USER_AGENT: &str = concat!("statusio/", env!("CARGO_PKG_VERSION"));

/// Upper bound for a single upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

// ── Errors ──────────────────────────────────────────────────────────

/// Why a provider could not be read. Never leaves the adapter boundary:
/// `DebridAdapter::status` turns it into a degraded record whose note is
/// this error's display string.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("missing credential")]
    MissingCredential,
    #[error("HTTP {0}")]
    Http(u16),
    #[error("bad response")]
    Malformed(String),
    #[error("network {0}")]
    Network(reqwest::Error),
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        // Query-string auth puts the secret in the URL.
        ProbeError::Network(e.without_url())
    }
}

// ── Request ─────────────────────────────────────────────────────────

/// Everything an adapter needs for one probe.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub secret: String,
    pub auth: AuthVariant,
    /// Endpoint override, for providers that allow one.
    pub endpoint: Option<String>,
}

impl ProbeRequest {
    pub fn bearer(secret: impl Into<String>) -> Self {
        Self { secret: secret.into(), auth: AuthVariant::Bearer, endpoint: None }
    }

    /// `None` when the config has no credential for the provider.
    pub fn from_config(cfg: &ResolvedConfig, provider: Provider) -> Option<Self> {
        Some(Self {
            secret: cfg.credential(provider)?.to_string(),
            auth: cfg.auth(provider),
            endpoint: cfg.endpoint(provider).map(str::to_string),
        })
    }
}

// ── Adapter Trait ───────────────────────────────────────────────────

#[async_trait]
pub trait DebridAdapter: Send + Sync {
    fn provider(&self) -> Provider;

    /// Human-readable provider name, used as the record name.
    fn display_name(&self) -> &str {
        self.provider().label()
    }

    /// Issue one request to the account endpoint and normalize the answer.
    async fn probe(&self, req: &ProbeRequest) -> Result<StatusRecord, ProbeError>;

    /// Probe, absorbing every failure into a degraded record.
    ///
    /// A missing credential short-circuits before any network I/O.
    async fn status(&self, req: Option<&ProbeRequest>) -> StatusRecord {
        let name = self.display_name().to_string();
        let Some(req) = req else {
            debug!(provider = %self.provider().id(), "No credential, skipping probe");
            return StatusRecord::unknown(name, ProbeError::MissingCredential.to_string());
        };

        match self.probe(req).await {
            Ok(record) => {
                debug!(
                    provider = %self.provider().id(),
                    premium = ?record.premium,
                    days_left = ?record.days_left,
                    "Status probed"
                );
                record
            }
            Err(e) => {
                match &e {
                    ProbeError::Malformed(detail) => {
                        warn!(provider = %self.provider().id(), detail = %detail, "Unexpected response shape")
                    }
                    other => warn!(provider = %self.provider().id(), "Probe failed: {}", other),
                }
                StatusRecord::unknown(name, e.to_string())
            }
        }
    }
}

// ── Shared plumbing ─────────────────────────────────────────────────

/// HTTP client shared by all adapters.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Success status and a JSON object body, or the matching `ProbeError`.
pub(crate) async fn read_json(resp: reqwest::Response) -> Result<Value, ProbeError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ProbeError::Http(status.as_u16()));
    }
    let body = resp.bytes().await?;
    let json: Value =
        serde_json::from_slice(&body).map_err(|e| ProbeError::Malformed(e.to_string()))?;
    if !json.is_object() {
        return Err(ProbeError::Malformed("body is not a JSON object".into()));
    }
    Ok(json)
}

// ── Registry ────────────────────────────────────────────────────────

/// Adapters keyed by provider.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Provider, Arc<dyn DebridAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All five production adapters sharing one client.
    pub fn standard(client: reqwest::Client) -> Self {
        Self::new()
            .with(realdebrid::RealDebridAdapter::new(client.clone()))
            .with(alldebrid::AllDebridAdapter::new(client.clone()))
            .with(premiumize::PremiumizeAdapter::new(client.clone()))
            .with(torbox::TorBoxAdapter::new(client.clone()))
            .with(debridlink::DebridLinkAdapter::new(client))
    }

    /// Register (or replace) the adapter for its provider.
    pub fn with(mut self, adapter: impl DebridAdapter + 'static) -> Self {
        self.adapters.insert(adapter.provider(), Arc::new(adapter));
        self
    }

    pub fn get(&self, provider: Provider) -> Option<Arc<dyn DebridAdapter>> {
        self.adapters.get(&provider).cloned()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
