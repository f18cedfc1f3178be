//! Statusio engine: provider adapters, result cache, aggregation and cards.

pub mod adapters;
pub mod aggregator;
pub mod cache;
pub mod card;
pub mod demo;
pub mod expiry;
pub mod fingerprint;
pub mod rules;

pub use adapters::{AdapterRegistry, DebridAdapter, ProbeError, ProbeRequest};
pub use aggregator::{AggregateError, StatusReport, StatusService};
pub use cache::{CacheError, KvCache, KvStore, MemoryCache, RedisStore, StatusCache};
pub use card::{render_card, Bucket, Card};
pub use fingerprint::Fingerprint;
