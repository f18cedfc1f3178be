use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized premium status of one debrid account.
///
/// Built once per provider per query and never mutated afterwards. Use the
/// constructors rather than struct literals so the inactive invariant
/// (`days_left == Some(0)`, no expiry instant) always holds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StatusRecord {
    pub name: String,

    /// `Some(true)` active, `Some(false)` confirmed inactive, `None` unknown.
    pub premium: Option<bool>,

    #[serde(rename = "daysLeft")]
    pub days_left: Option<u32>,

    #[serde(rename = "untilISO")]
    pub until: Option<DateTime<Utc>>,

    /// Always serialized, `null` when the upstream has no identity for us.
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StatusRecord {
    /// An active subscription. `days_left` may be unknown.
    pub fn active(
        name: impl Into<String>,
        days_left: Option<u32>,
        until: Option<DateTime<Utc>>,
        username: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            premium: Some(true),
            days_left,
            until,
            username,
            note: None,
        }
    }

    pub fn inactive(name: impl Into<String>, username: Option<String>) -> Self {
        Self {
            name: name.into(),
            premium: Some(false),
            days_left: Some(0),
            until: None,
            username,
            note: None,
        }
    }

    /// A degraded record: the provider could not be read.
    pub fn unknown(name: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            premium: None,
            days_left: None,
            until: None,
            username: None,
            note: Some(note.into()),
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    /// Whether the record says anything about the account at all.
    pub fn is_informative(&self) -> bool {
        self.premium.is_some() || self.username.is_some()
    }

    /// Whether every field is empty (nothing worth rendering).
    pub fn is_blank(&self) -> bool {
        self.premium.is_none()
            && self.username.is_none()
            && self.days_left.map_or(true, |d| d == 0)
            && self.until.is_none()
            && self.note.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_has_zero_days_and_no_expiry() {
        let r = StatusRecord::inactive("AllDebrid", Some("alldev".into()));
        assert_eq!(r.premium, Some(false));
        assert_eq!(r.days_left, Some(0));
        assert!(r.until.is_none());
    }

    #[test]
    fn test_username_serialized_as_null() {
        let r = StatusRecord::unknown("TorBox", "HTTP 401");
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("username").unwrap().is_null());
        assert_eq!(json["note"], "HTTP 401");
        assert!(json["daysLeft"].is_null());
    }

    #[test]
    fn test_note_omitted_when_absent() {
        let r = StatusRecord::active("Real-Debrid", Some(3), None, None);
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("note").is_none());
        assert_eq!(json["premium"], true);
    }

    #[test]
    fn test_roundtrip_through_json() {
        let until = "2030-01-02T03:04:05Z".parse::<DateTime<Utc>>().unwrap();
        let r = StatusRecord::active("Premiumize", Some(12), Some(until), Some("123456".into()));
        let back: StatusRecord = serde_json::from_str(&serde_json::to_string(&r).unwrap()).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_blank_and_informative() {
        let mut r = StatusRecord::unknown("X", "n");
        assert!(!r.is_blank());
        assert!(!r.is_informative());
        r.note = None;
        assert!(r.is_blank());
        assert!(StatusRecord::inactive("X", None).is_informative());
    }
}
