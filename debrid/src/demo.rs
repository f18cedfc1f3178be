//! Canned status lists for trying the add-on without real credentials.

use chrono::{DateTime, TimeDelta, Utc};
use common::{DemoMode, Provider, StatusRecord};

fn active(p: Provider, days: u32, user: &str, now: DateTime<Utc>) -> StatusRecord {
    let until = now.checked_add_signed(TimeDelta::days(i64::from(days)));
    StatusRecord::active(p.label(), Some(days), until, Some(user.to_string()))
}

/// Records for a demo profile, relative to `now`. Empty when demo is off.
pub fn records(mode: DemoMode, now: DateTime<Utc>) -> Vec<StatusRecord> {
    match mode {
        DemoMode::Off => Vec::new(),
        DemoMode::AllActive => vec![
            active(Provider::RealDebrid, 23, "a1337user", now),
            active(Provider::AllDebrid, 17, "alldev", now),
            active(Provider::Premiumize, 30, "123456", now),
            active(Provider::TorBox, 9, "tbx", now),
            active(Provider::DebridLink, 6, "amy", now),
        ],
        DemoMode::SomeOff => vec![
            active(Provider::RealDebrid, 21, "a1337user", now),
            active(Provider::AllDebrid, 12, "alldev", now),
            StatusRecord::inactive(Provider::Premiumize.label(), Some("123456".into())),
            StatusRecord::unknown(Provider::TorBox.label(), "HTTP 401"),
            active(Provider::DebridLink, 5, "amy", now),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_active_profile() {
        let now = Utc::now();
        let r = records(DemoMode::AllActive, now);
        assert_eq!(r.len(), 5);
        assert!(r.iter().all(|x| x.premium == Some(true)));
        assert_eq!(r[3].username.as_deref(), Some("tbx"));
        assert_eq!(r[2].until, now.checked_add_signed(TimeDelta::days(30)));
    }

    #[test]
    fn test_some_off_profile() {
        let r = records(DemoMode::SomeOff, Utc::now());
        let names: Vec<&str> = r.iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names, ["Real-Debrid", "AllDebrid", "Premiumize", "TorBox", "Debrid-Link"]);
        assert_eq!(r[2].premium, Some(false));
        assert_eq!(r[3].note.as_deref(), Some("HTTP 401"));
        assert_eq!(r[4].days_left, Some(5));
    }

    #[test]
    fn test_off_is_empty() {
        assert!(records(DemoMode::Off, Utc::now()).is_empty());
    }
}
