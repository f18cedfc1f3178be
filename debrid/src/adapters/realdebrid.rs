//! Real-Debrid adapter: `GET /rest/1.0/user` with a bearer token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Provider, StatusRecord};
use serde_json::Value;

use super::*;
use crate::rules::{DecisionTable, ExpiryRule, Extraction, PremiumRule};

pub const DEFAULT_BASE_URL: &str = "https://api.real-debrid.com/rest/1.0";

/// `expiration` wins over `premium_until`/`premiumUntil`. A numeric
/// `expiration` is epoch seconds only when it is large enough to be one;
/// anything else is read as a date string.
const TABLE: DecisionTable = DecisionTable {
    username: &["/username", "/user"],
    premium: &[PremiumRule::FlagTrue("/premium"), PremiumRule::Equals("/type", "premium")],
    expiry: &[
        ExpiryRule { name: "expiration", fields: &["/expiration"], extraction: Extraction::EpochOrDate },
        ExpiryRule {
            name: "premium_until",
            fields: &["/premium_until", "/premiumUntil"],
            extraction: Extraction::Epoch,
        },
    ],
};

pub struct RealDebridAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl RealDebridAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: DEFAULT_BASE_URL.to_string() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn normalize(body: &Value, now: DateTime<Utc>) -> StatusRecord {
    let name = Provider::RealDebrid.label();
    let username = TABLE.username(body);
    if !TABLE.premium_flag(body) {
        return StatusRecord::inactive(name, username);
    }
    let remaining = TABLE.remaining(body, now);
    StatusRecord::active(
        name,
        remaining.map(|r| r.days),
        remaining.and_then(|r| r.until),
        username,
    )
}

#[async_trait]
impl DebridAdapter for RealDebridAdapter {
    fn provider(&self) -> Provider { Provider::RealDebrid }

    async fn probe(&self, req: &ProbeRequest) -> Result<StatusRecord, ProbeError> {
        let resp = self.client.get(format!("{}/user", self.base_url))
            .bearer_auth(&req.secret)
            .send().await?;
        let body = read_json(resp).await?;
        Ok(normalize(&body, Utc::now()))
    }
}
