//! Stremio add-on protocol envelopes (manifest and stream responses).

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    #[serde(rename = "idPrefixes", default, skip_serializing_if = "Option::is_none")]
    pub id_prefixes: Option<Vec<String>>,
    pub catalogs: Vec<serde_json::Value>,
    #[serde(rename = "behaviorHints")]
    pub behavior_hints: ManifestHints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default)]
    pub config: Vec<ConfigField>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ManifestHints {
    pub configurable: bool,
    #[serde(rename = "configurationRequired")]
    pub configuration_required: bool,
}

/// One entry of the host-rendered configuration form.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConfigField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String, // "text" | "number" | "select"
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl ConfigField {
    pub fn text(name: &str, title: &str) -> Self {
        Self {
            name: name.into(),
            kind: "text".into(),
            title: title.into(),
            options: None,
            multiple: None,
            required: None,
            default: None,
        }
    }

    pub fn select(name: &str, title: &str, options: Vec<String>) -> Self {
        Self { kind: "select".into(), options: Some(options), ..Self::text(name, title) }
    }

    pub fn with_default(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StreamHints {
    #[serde(rename = "notWebReady")]
    pub not_web_ready: bool,
}

/// An info-only "stream" entry; the host shows its title/description.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Stream {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "externalUrl")]
    pub external_url: String,
    #[serde(rename = "behaviorHints")]
    pub behavior_hints: StreamHints,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StreamResponse {
    pub streams: Vec<Stream>,
    #[serde(rename = "cacheMaxAge", default, skip_serializing_if = "Option::is_none")]
    pub cache_max_age: Option<u64>,
    #[serde(rename = "staleRevalidate", default, skip_serializing_if = "Option::is_none")]
    pub stale_revalidate: Option<u64>,
    #[serde(rename = "staleError", default, skip_serializing_if = "Option::is_none")]
    pub stale_error: Option<u64>,
}

impl StreamResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Same max-age for fresh, stale-revalidate and stale-error windows.
    pub fn cached_for(streams: Vec<Stream>, secs: u64) -> Self {
        Self {
            streams,
            cache_max_age: Some(secs),
            stale_revalidate: Some(secs),
            stale_error: Some(secs),
        }
    }
}
