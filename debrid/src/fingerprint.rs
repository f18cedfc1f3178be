//! Cache keys derived from a resolved configuration.

use common::{Provider, ResolvedConfig};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Short, log-safe form of a secret: first and last four characters.
pub fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len().max(3));
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

/// Everything that can change the aggregated result for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    enabled: Vec<Provider>,
    credentials: Vec<(Provider, Option<String>)>,
    premiumize_auth: &'static str,
    debridlink_auth: &'static str,
    debridlink_endpoint: String,
    demo: &'static str,
    ttl_minutes: u64,
}

impl Fingerprint {
    pub fn from_config(cfg: &ResolvedConfig) -> Self {
        Self {
            enabled: cfg.enabled.clone(),
            credentials: cfg
                .enabled
                .iter()
                .map(|p| (*p, cfg.credential(*p).map(str::to_string)))
                .collect(),
            premiumize_auth: cfg.premiumize_auth.as_str(),
            debridlink_auth: cfg.debridlink_auth.as_str(),
            debridlink_endpoint: cfg.debridlink_endpoint.clone(),
            demo: cfg.demo.id(),
            ttl_minutes: cfg.cache_minutes,
        }
    }

    fn render(&self, secret: impl Fn(&str) -> String) -> String {
        let mut out = String::new();
        let tags: Vec<&str> = self.enabled.iter().map(|p| p.tag()).collect();
        let _ = write!(out, "enabled={}", tags.join(","));
        for (p, cred) in &self.credentials {
            let shown = cred.as_deref().map(&secret).unwrap_or_default();
            let _ = write!(out, "|{}={}", p.tag(), shown);
        }
        let _ = write!(
            out,
            "|pm_auth={}|dl_auth={}|dl_endpoint={}|demo={}|ttl={}",
            self.premiumize_auth, self.debridlink_auth, self.debridlink_endpoint, self.demo, self.ttl_minutes
        );
        out
    }

    /// Human-readable form with redacted credentials.
    pub fn describe(&self) -> String {
        self.render(redact)
    }

    /// Stable cache key: sha256 hex over the full parts.
    pub fn key(&self) -> String {
        let digest = Sha256::digest(self.render(str::to_string).as_bytes());
        hex::encode(digest)
    }
}
