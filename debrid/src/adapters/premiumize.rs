//! Premiumize adapter: `GET /api/account/info` with the key in the query.
//!
//! Premium status is derived entirely from `premium_until`: the account is
//! premium iff that instant is still in the future.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AuthVariant, Provider, StatusRecord};
use serde_json::Value;

use super::*;
use crate::expiry::Remaining;
use crate::rules::{DecisionTable, ExpiryRule, Extraction};

pub const DEFAULT_BASE_URL: &str = "https://www.premiumize.me/api";

const TABLE: DecisionTable = DecisionTable {
    username: &["/customer_id"],
    premium: &[],
    expiry: &[ExpiryRule { name: "premium_until", fields: &["/premium_until"], extraction: Extraction::Epoch }],
};

pub struct PremiumizeAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl PremiumizeAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client, base_url: DEFAULT_BASE_URL.to_string() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Query parameter carrying the credential.
fn auth_param(auth: AuthVariant) -> &'static str {
    match auth {
        AuthVariant::AccessTokenQuery => "access_token",
        AuthVariant::Bearer | AuthVariant::ApiKeyQuery => "apikey",
    }
}

fn normalize(body: &Value, now: DateTime<Utc>) -> Result<StatusRecord, ProbeError> {
    let ok = match body.get("status") {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("success"),
        _ => false,
    };
    if !ok {
        return Err(ProbeError::Malformed("status is not \"success\"".into()));
    }

    let name = Provider::Premiumize.label();
    let username = TABLE.username(body);
    let remaining = TABLE.remaining(body, now).unwrap_or(Remaining::NONE);
    if remaining.is_positive() {
        Ok(StatusRecord::active(name, Some(remaining.days), remaining.until, username))
    } else {
        Ok(StatusRecord::inactive(name, username))
    }
}

#[async_trait]
impl DebridAdapter for PremiumizeAdapter {
    fn provider(&self) -> Provider { Provider::Premiumize }

    async fn probe(&self, req: &ProbeRequest) -> Result<StatusRecord, ProbeError> {
        let resp = self.client.get(format!("{}/account/info", self.base_url))
            .query(&[(auth_param(req.auth), req.secret.as_str())])
            .send().await?;
        let body = read_json(resp).await?;
        normalize(&body, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_future_until_is_premium() {
        let body = json!({"status": "success", "customer_id": 123456, "premium_until": 1_700_000_000 + 30 * 86_400});
        let r = normalize(&body, now()).unwrap();
        assert_eq!(r.premium, Some(true));
        assert_eq!(r.days_left, Some(30));
        assert_eq!(r.username.as_deref(), Some("123456"));
    }

    #[test]
    fn test_past_or_missing_until_is_inactive() {
        for body in [
            json!({"status": "SUCCESS", "premium_until": 1_600_000_000}),
            json!({"status": "success", "premium_until": false}),
            json!({"status": "success"}),
        ] {
            let r = normalize(&body, now()).unwrap();
            assert_eq!(r.premium, Some(false), "{}", body);
            assert_eq!(r.days_left, Some(0));
            assert_eq!(r.until, None);
        }
    }

    #[test]
    fn test_error_status_is_malformed() {
        let body = json!({"status": "error", "message": "Not logged in."});
        assert!(normalize(&body, now()).is_err());
    }

    #[tokio::test]
    async fn test_auth_style_selects_query_param() {
        let mut server = mockito::Server::new_async().await;
        let apikey = server.mock("GET", "/account/info")
            .match_query(Matcher::UrlEncoded("apikey".into(), "pm-key".into()))
            .with_body(r#"{"status":"success","premium_until":0}"#)
            .expect(1)
            .create_async().await;
        let oauth = server.mock("GET", "/account/info")
            .match_query(Matcher::UrlEncoded("access_token".into(), "pm-token".into()))
            .with_body(r#"{"status":"success","premium_until":0}"#)
            .expect(1)
            .create_async().await;

        let adapter = PremiumizeAdapter::new(reqwest::Client::new()).with_base_url(server.url());
        let key = ProbeRequest { secret: "pm-key".into(), auth: AuthVariant::ApiKeyQuery, endpoint: None };
        let token = ProbeRequest { secret: "pm-token".into(), auth: AuthVariant::AccessTokenQuery, endpoint: None };

        assert_eq!(adapter.status(Some(&key)).await.premium, Some(false));
        assert_eq!(adapter.status(Some(&token)).await.premium, Some(false));
        apikey.assert_async().await;
        oauth.assert_async().await;
    }
}
