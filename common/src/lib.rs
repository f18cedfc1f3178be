//! Shared types for the Statusio add-on: the normalized account status
//! record, the per-request add-on configuration, and the Stremio protocol
//! envelopes the gateway speaks.

pub mod config;
pub mod protocol;
pub mod status;

pub use config::{AddonConfig, AuthVariant, DemoMode, EnvCredentials, Provider, ResolvedConfig};
pub use status::StatusRecord;
