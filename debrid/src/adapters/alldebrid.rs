//! AllDebrid adapter: `GET /v4/user` with a bearer key.
//!
//! Trusts the explicit `isPremium` flag; `premiumUntil` only contributes
//! the remaining days.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Provider, StatusRecord};
use serde_json::Value;

use super::*;
use crate::rules::{is_present, DecisionTable, ExpiryRule, Extraction, PremiumRule};

pub const DEFAULT_BASE_URL: &str = "https://api.alldebrid.com/v4";

const TABLE: DecisionTable = DecisionTable {
    username: &["/username"],
    premium: &[PremiumRule::Flag("/isPremium")],
    expiry: &[ExpiryRule { name: "premiumUntil", fields: &["/premiumUntil"], extraction: Extraction::PositiveEpoch }],
};

pub struct AllDebridAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl AllDebridAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: DEFAULT_BASE_URL.to_string() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn normalize(body: &Value, now: DateTime<Utc>) -> Result<StatusRecord, ProbeError> {
    if body.get("status").and_then(Value::as_str) != Some("success") {
        return Err(ProbeError::Malformed("status is not \"success\"".into()));
    }
    let user = body
        .pointer("/data/user")
        .filter(|u| is_present(u))
        .ok_or_else(|| ProbeError::Malformed("missing data.user".into()))?;

    let name = Provider::AllDebrid.label();
    let username = TABLE.username(user);
    if !TABLE.premium_flag(user) {
        return Ok(StatusRecord::inactive(name, username));
    }
    let remaining = TABLE.remaining(user, now);
    Ok(StatusRecord::active(
        name,
        remaining.map(|r| r.days),
        remaining.and_then(|r| r.until),
        username,
    ))
}

#[async_trait]
impl DebridAdapter for AllDebridAdapter {
    fn provider(&self) -> Provider { Provider::AllDebrid }

    async fn probe(&self, req: &ProbeRequest) -> Result<StatusRecord, ProbeError> {
        let resp = self.client.get(format!("{}/user", self.base_url))
            .bearer_auth(&req.secret)
            .send().await?;
        let body = read_json(resp).await?;
        normalize(&body, Utc::now())
    }
}
