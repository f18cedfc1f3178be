//! TorBox adapter: `GET /v1/api/user/me?settings=true` with a bearer token.
//!
//! The user object may sit under `data.user`, `user`, or at the root.
//! Premium if the flag says so, else if the account type says so, else if
//! a remaining duration is positive.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Provider, StatusRecord};
use serde_json::Value;

use super::*;
use crate::expiry::Remaining;
use crate::rules::{first_present, DecisionTable, ExpiryRule, Extraction, PremiumRule};

pub const DEFAULT_BASE_URL: &str = "https://api.torbox.app/v1/api";

const USER_LOCATIONS: &[&str] = &["/data/user", "/user"];

const TABLE: DecisionTable = DecisionTable {
    username: &["/username"],
    premium: &[PremiumRule::FlagTrue("/isPremium"), PremiumRule::Equals("/accountType", "premium")],
    expiry: &[
        ExpiryRule { name: "premiumUntil", fields: &["/premiumUntil"], extraction: Extraction::Epoch },
        ExpiryRule {
            name: "premium_left",
            fields: &["/premium_left", "/premiumLeft", "/remainingPremiumSeconds"],
            extraction: Extraction::Duration,
        },
    ],
};

pub struct TorBoxAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl TorBoxAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: DEFAULT_BASE_URL.to_string() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn normalize(body: &Value, now: DateTime<Utc>) -> StatusRecord {
    let user = first_present(body, USER_LOCATIONS).unwrap_or(body);
    let name = Provider::TorBox.label();
    let username = TABLE.username(user);
    let remaining = TABLE.remaining(user, now).unwrap_or(Remaining::NONE);

    if TABLE.premium_flag(user) {
        let days = Some(remaining.days).filter(|d| *d > 0);
        return StatusRecord::active(name, days, remaining.until, username);
    }
    if remaining.is_positive() {
        return StatusRecord::active(name, Some(remaining.days), remaining.until, username);
    }
    let note = user.get("note").and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string);
    StatusRecord::inactive(name, username).with_note(note)
}

#[async_trait]
impl DebridAdapter for TorBoxAdapter {
    fn provider(&self) -> Provider { Provider::TorBox }

    async fn probe(&self, req: &ProbeRequest) -> Result<StatusRecord, ProbeError> {
        let resp = self.client.get(format!("{}/user/me", self.base_url))
            .query(&[("settings", "true")])
            .bearer_auth(&req.secret)
            .send().await?;
        let body = read_json(resp).await?;
        Ok(normalize(&body, Utc::now()))
    }
}
