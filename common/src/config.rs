//! Per-request add-on configuration.
//!
//! The host hands us a loosely typed JSON bag (labels from the config UI,
//! numbers that may arrive as strings, credentials that may be missing).
//! `AddonConfig` accepts that shape as-is; `AddonConfig::resolve` turns it
//! into a `ResolvedConfig` the engine can trust.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_CACHE_MINUTES: u64 = 45;
/// One year.
pub const MAX_CACHE_MINUTES: u64 = 525_600;
pub const DEFAULT_DEBRIDLINK_ENDPOINT: &str = "https://debrid-link.com/api/account/infos";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config segment is neither JSON nor base64 JSON")]
    Undecodable,
    #[error("config JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

// ── Providers ───────────────────────────────────────────────────────

/// The supported debrid services, in their fixed enablement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    RealDebrid,
    AllDebrid,
    Premiumize,
    TorBox,
    DebridLink,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::RealDebrid,
        Provider::AllDebrid,
        Provider::Premiumize,
        Provider::TorBox,
        Provider::DebridLink,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Provider::RealDebrid => "realdebrid",
            Provider::AllDebrid => "alldebrid",
            Provider::Premiumize => "premiumize",
            Provider::TorBox => "torbox",
            Provider::DebridLink => "debridlink",
        }
    }

    /// Display name, also the label the config UI offers.
    pub fn label(self) -> &'static str {
        match self {
            Provider::RealDebrid => "Real-Debrid",
            Provider::AllDebrid => "AllDebrid",
            Provider::Premiumize => "Premiumize",
            Provider::TorBox => "TorBox",
            Provider::DebridLink => "Debrid-Link",
        }
    }

    /// Short tag used in cache fingerprints.
    pub fn tag(self) -> &'static str {
        match self {
            Provider::RealDebrid => "rd",
            Provider::AllDebrid => "ad",
            Provider::Premiumize => "pm",
            Provider::TorBox => "tb",
            Provider::DebridLink => "dl",
        }
    }

    /// Accepts either the UI label or the internal id.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s) || p.id().eq_ignore_ascii_case(s))
    }
}

// ── Auth variants ───────────────────────────────────────────────────

/// How a credential is presented to an upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthVariant {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `?apikey=<token>`
    ApiKeyQuery,
    /// `?access_token=<token>` (OAuth)
    AccessTokenQuery,
}

impl AuthVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthVariant::Bearer => "bearer",
            AuthVariant::ApiKeyQuery => "apikey",
            AuthVariant::AccessTokenQuery => "oauth",
        }
    }
}

/// Config UI options for Premiumize: (id, label, variant).
pub const PREMIUMIZE_AUTH_OPTIONS: [(&str, &str, AuthVariant); 2] = [
    ("apikey", "apikey (query)", AuthVariant::ApiKeyQuery),
    ("oauth", "access_token (OAuth query)", AuthVariant::AccessTokenQuery),
];

/// Config UI options for Debrid-Link: (id, label, variant).
pub const DEBRIDLINK_AUTH_OPTIONS: [(&str, &str, AuthVariant); 2] = [
    ("Bearer", "Authorization: Bearer <token>", AuthVariant::Bearer),
    ("query", "?apikey=<token>", AuthVariant::ApiKeyQuery),
];

fn pick_option(
    options: &[(&str, &str, AuthVariant)],
    raw: Option<&str>,
    fallback: AuthVariant,
) -> AuthVariant {
    let Some(raw) = raw.map(str::trim) else {
        return fallback;
    };
    options
        .iter()
        .find(|(id, label, _)| *label == raw || id.eq_ignore_ascii_case(raw))
        .map(|(_, _, v)| *v)
        .unwrap_or(fallback)
}

// ── Demo mode ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoMode {
    #[default]
    Off,
    AllActive,
    SomeOff,
}

impl DemoMode {
    pub const OPTIONS: [(&'static str, &'static str, DemoMode); 3] = [
        ("off", "Off", DemoMode::Off),
        ("all_active", "Simulate all active", DemoMode::AllActive),
        ("some_off", "Simulate some inactive", DemoMode::SomeOff),
    ];

    pub fn id(self) -> &'static str {
        match self {
            DemoMode::Off => "off",
            DemoMode::AllActive => "all_active",
            DemoMode::SomeOff => "some_off",
        }
    }

    pub fn is_off(self) -> bool {
        self == DemoMode::Off
    }

    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return DemoMode::Off;
        };
        Self::OPTIONS
            .iter()
            .find(|(id, label, _)| *label == raw || id.eq_ignore_ascii_case(raw))
            .map(|(_, _, m)| *m)
            .unwrap_or(DemoMode::Off)
    }
}

// ── Raw config ──────────────────────────────────────────────────────

/// The config bag as the host sends it. Every field is optional and loosely
/// typed; nothing here is validated until `resolve`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AddonConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers_enabled: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_minutes: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rd_token: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_key: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm_key: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm_auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tb_token: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dl_key: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dl_auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dl_endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_mode: Option<String>,
}

/// Credentials available from the process environment, used when the
/// request config does not carry one.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials {
    pub rd_token: Option<String>,
    pub ad_key: Option<String>,
    pub pm_key: Option<String>,
    pub tb_token: Option<String>,
    pub dl_key: Option<String>,
}

impl EnvCredentials {
    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::RealDebrid => self.rd_token.as_deref(),
            Provider::AllDebrid => self.ad_key.as_deref(),
            Provider::Premiumize => self.pm_key.as_deref(),
            Provider::TorBox => self.tb_token.as_deref(),
            Provider::DebridLink => self.dl_key.as_deref(),
        }
    }
}

/// First candidate that is non-empty after trimming, in the order given.
pub fn resolve_credential<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn value_as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer prefix of a value, like a lenient base-10 parse of form input.
fn leading_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64),
        Value::String(s) => {
            let s = s.trim();
            let (sign, digits) = match s.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, s.strip_prefix('+').unwrap_or(s)),
            };
            let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
            digits[..end].parse::<i64>().ok().map(|n| sign * n)
        }
        _ => None,
    }
}

impl AddonConfig {
    /// Decode a config carried in a URL: raw JSON, or base64 (standard or
    /// URL-safe, padded or not) wrapping JSON.
    pub fn decode(segment: &str) -> Result<Self, ConfigError> {
        let segment = segment.trim();
        if segment.starts_with('{') {
            return Ok(serde_json::from_str(segment)?);
        }

        use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
        let bytes = [STANDARD, URL_SAFE, STANDARD_NO_PAD, URL_SAFE_NO_PAD]
            .iter()
            .find_map(|engine| engine.decode(segment).ok())
            .ok_or(ConfigError::Undecodable)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn raw_credential(&self, provider: Provider) -> Option<String> {
        let field = match provider {
            Provider::RealDebrid => &self.rd_token,
            Provider::AllDebrid => &self.ad_key,
            Provider::Premiumize => &self.pm_key,
            Provider::TorBox => &self.tb_token,
            Provider::DebridLink => &self.dl_key,
        };
        field.as_ref().and_then(value_as_string)
    }

    fn selected_providers(&self) -> Vec<Provider> {
        let labels: Vec<String> = match &self.providers_enabled {
            Some(Value::Array(items)) => items.iter().filter_map(value_as_string).collect(),
            Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
            _ => Vec::new(),
        };
        let mut ids: Vec<Provider> = labels.iter().filter_map(|l| Provider::parse(l)).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    fn cache_minutes(&self) -> u64 {
        match self.cache_minutes.as_ref().and_then(leading_integer) {
            Some(n) => n.clamp(1, MAX_CACHE_MINUTES as i64) as u64,
            None => DEFAULT_CACHE_MINUTES,
        }
    }

    /// Resolve against environment fallbacks.
    ///
    /// An explicit provider selection wins; without one, every provider with
    /// a resolvable credential is enabled. Output order is always
    /// `Provider::ALL` order.
    pub fn resolve(&self, env: &EnvCredentials) -> ResolvedConfig {
        let mut credentials = HashMap::new();
        for provider in Provider::ALL {
            let from_request = self.raw_credential(provider);
            if let Some(secret) = resolve_credential([from_request.as_deref(), env.get(provider)]) {
                credentials.insert(provider, secret);
            }
        }

        let selected = self.selected_providers();
        let enabled = if selected.is_empty() {
            Provider::ALL
                .into_iter()
                .filter(|p| credentials.contains_key(p))
                .collect()
        } else {
            selected
        };

        let dl_endpoint = self
            .dl_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_DEBRIDLINK_ENDPOINT)
            .to_string();

        ResolvedConfig {
            enabled,
            credentials,
            premiumize_auth: pick_option(
                &PREMIUMIZE_AUTH_OPTIONS,
                self.pm_auth.as_deref(),
                AuthVariant::ApiKeyQuery,
            ),
            debridlink_auth: pick_option(
                &DEBRIDLINK_AUTH_OPTIONS,
                self.dl_auth.as_deref(),
                AuthVariant::Bearer,
            ),
            debridlink_endpoint: dl_endpoint,
            cache_minutes: self.cache_minutes(),
            demo: DemoMode::parse(self.demo_mode.as_deref()),
        }
    }
}

// ── Resolved config ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Enabled providers in fixed order.
    pub enabled: Vec<Provider>,
    credentials: HashMap<Provider, String>,
    pub premiumize_auth: AuthVariant,
    pub debridlink_auth: AuthVariant,
    pub debridlink_endpoint: String,
    pub cache_minutes: u64,
    pub demo: DemoMode,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        AddonConfig::default().resolve(&EnvCredentials::default())
    }
}

impl ResolvedConfig {
    pub fn credential(&self, provider: Provider) -> Option<&str> {
        self.credentials.get(&provider).map(String::as_str)
    }

    pub fn auth(&self, provider: Provider) -> AuthVariant {
        match provider {
            Provider::Premiumize => self.premiumize_auth,
            Provider::DebridLink => self.debridlink_auth,
            _ => AuthVariant::Bearer,
        }
    }

    pub fn endpoint(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::DebridLink => Some(&self.debridlink_endpoint),
            _ => None,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_minutes.saturating_mul(60))
    }

    pub fn has_enabled(&self) -> bool {
        !self.enabled.is_empty()
    }
}
