//! Debrid-Link adapter: account infos with bearer or `?apikey=` auth and a
//! per-request endpoint override.
//!
//! Premium is derived only from a positive `premiumLeft` duration; the
//! account type is reported in the note of inactive records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::config::DEFAULT_DEBRIDLINK_ENDPOINT;
use common::{AuthVariant, Provider, StatusRecord};
use serde_json::Value;

use super::*;
use crate::expiry::Remaining;
use crate::rules::{is_present, DecisionTable, ExpiryRule, Extraction};

const TABLE: DecisionTable = DecisionTable {
    username: &["/username"],
    premium: &[],
    expiry: &[ExpiryRule { name: "premiumLeft", fields: &["/premiumLeft"], extraction: Extraction::Duration }],
};

pub struct DebridLinkAdapter {
    client: reqwest::Client,
}

impl DebridLinkAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn normalize(body: &Value, now: DateTime<Utc>) -> Result<StatusRecord, ProbeError> {
    if !body.get("success").map_or(false, is_present) {
        return Err(ProbeError::Malformed("success flag not set".into()));
    }
    let value = body
        .get("value")
        .filter(|v| is_present(v))
        .ok_or_else(|| ProbeError::Malformed("missing value".into()))?;

    let name = Provider::DebridLink.label();
    let username = TABLE.username(value);
    let remaining = TABLE.remaining(value, now).unwrap_or(Remaining::NONE);
    if remaining.is_positive() {
        return Ok(StatusRecord::active(name, Some(remaining.days), remaining.until, username));
    }

    let account_type = match value.get("accountType") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "?".to_string(),
        Some(other) => other.to_string(),
    };
    Ok(StatusRecord::inactive(name, username).with_note(Some(format!("accountType={}", account_type))))
}

#[async_trait]
impl DebridAdapter for DebridLinkAdapter {
    fn provider(&self) -> Provider { Provider::DebridLink }

    async fn probe(&self, req: &ProbeRequest) -> Result<StatusRecord, ProbeError> {
        let endpoint = req.endpoint.as_deref().unwrap_or(DEFAULT_DEBRIDLINK_ENDPOINT);
        let request = self.client.get(endpoint);
        let request = match req.auth {
            AuthVariant::Bearer => request.bearer_auth(&req.secret),
            AuthVariant::ApiKeyQuery | AuthVariant::AccessTokenQuery => {
                request.query(&[("apikey", req.secret.as_str())])
            }
        };
        let body = read_json(request.send().await?).await?;
        normalize(&body, Utc::now())
    }
}
