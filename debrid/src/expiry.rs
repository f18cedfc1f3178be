//! Expiry math: raw upstream timestamps/durations to "days remaining".
//!
//! Rounding is always up: one second left reports as one day left. Every
//! function takes `now` explicitly so callers (and tests) control the clock.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

const DAY_MS: f64 = 86_400_000.0;

/// Whole days remaining plus the absolute expiry instant, when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub days: u32,
    pub until: Option<DateTime<Utc>>,
}

impl Remaining {
    pub const NONE: Remaining = Remaining { days: 0, until: None };

    pub fn is_positive(&self) -> bool {
        self.days > 0
    }
}

fn ceil_days(ms: f64) -> u32 {
    if ms <= 0.0 {
        return 0;
    }
    (ms / DAY_MS).ceil().min(u32::MAX as f64) as u32
}

fn plus_millis(now: DateTime<Utc>, ms: f64) -> Option<DateTime<Utc>> {
    TimeDelta::try_milliseconds(ms as i64).and_then(|d| now.checked_add_signed(d))
}

/// Remaining time until an absolute epoch-seconds instant.
///
/// Non-finite, non-positive or already-past inputs yield `Remaining::NONE`.
pub fn from_absolute(epoch_secs: f64, now: DateTime<Utc>) -> Remaining {
    if !epoch_secs.is_finite() || epoch_secs <= 0.0 {
        return Remaining::NONE;
    }
    let instant_ms = epoch_secs * 1000.0;
    let left_ms = instant_ms - now.timestamp_millis() as f64;
    if left_ms <= 0.0 {
        return Remaining::NONE;
    }
    Remaining {
        days: ceil_days(left_ms),
        until: DateTime::from_timestamp_millis(instant_ms as i64),
    }
}

/// Remaining time given a duration in seconds from `now`.
pub fn from_duration(secs: f64, now: DateTime<Utc>) -> Remaining {
    if !secs.is_finite() || secs <= 0.0 {
        return Remaining::NONE;
    }
    let ms = secs * 1000.0;
    Remaining {
        days: ceil_days(ms),
        until: plus_millis(now, ms),
    }
}

/// Remaining time until a date string (RFC 3339, `YYYY-MM-DD`, or a naive
/// `YYYY-MM-DDTHH:MM:SS` read as UTC).
///
/// Unlike `from_absolute`, a past date keeps its instant (with zero days).
/// Returns `None` when the string does not parse.
pub fn from_date(raw: &str, now: DateTime<Utc>) -> Option<Remaining> {
    let until = parse_date(raw.trim())?;
    let left_ms = (until - now).num_milliseconds() as f64;
    Some(Remaining {
        days: ceil_days(left_ms),
        until: Some(until),
    })
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_absolute_past_or_present_is_none() {
        let n = now().timestamp() as f64;
        for secs in [n, n - 1.0, n - 86_400.0 * 30.0, 1.0] {
            assert_eq!(from_absolute(secs, now()), Remaining::NONE, "epoch {}", secs);
        }
    }

    #[test]
    fn test_absolute_invalid_inputs() {
        assert_eq!(from_absolute(0.0, now()), Remaining::NONE);
        assert_eq!(from_absolute(-5.0, now()), Remaining::NONE);
        assert_eq!(from_absolute(f64::NAN, now()), Remaining::NONE);
        assert_eq!(from_absolute(f64::INFINITY, now()), Remaining::NONE);
    }

    #[test]
    fn test_absolute_rounds_up() {
        let n = now().timestamp() as f64;
        let one_sec = from_absolute(n + 1.0, now());
        assert_eq!(one_sec.days, 1);
        assert_eq!(one_sec.until.unwrap().timestamp(), now().timestamp() + 1);

        assert_eq!(from_absolute(n + 86_400.0, now()).days, 1);
        assert_eq!(from_absolute(n + 86_401.0, now()).days, 2);
        assert_eq!(from_absolute(n + 10.0 * 86_400.0, now()).days, 10);
    }

    #[test]
    fn test_duration_matches_ceil_of_days() {
        for secs in [0.5_f64, 1.0, 3_600.0, 86_399.0, 86_400.0, 86_401.0, 1_000_000.0, 31_536_000.0] {
            let r = from_duration(secs, now());
            assert_eq!(r.days as f64, (secs / 86_400.0).ceil(), "secs {}", secs);
            assert!(r.until.unwrap() >= now());
        }
    }

    #[test]
    fn test_duration_invalid_inputs() {
        assert_eq!(from_duration(0.0, now()), Remaining::NONE);
        assert_eq!(from_duration(-1.0, now()), Remaining::NONE);
        assert_eq!(from_duration(f64::NAN, now()), Remaining::NONE);
    }

    #[test]
    fn test_duration_until_is_now_plus_secs() {
        let r = from_duration(86_400.0 * 2.0, now());
        assert_eq!(r.until.unwrap().timestamp(), now().timestamp() + 172_800);
    }

    #[test]
    fn test_date_strings() {
        let r = from_date("2023-11-24T22:13:20Z", now()).unwrap();
        assert_eq!(r.days, 10);

        let past = from_date("2020-01-01", now()).unwrap();
        assert_eq!(past.days, 0);
        assert!(past.until.is_some());

        assert!(from_date("2023-11-20T00:00:00", now()).is_some());
        assert!(from_date("not a date", now()).is_none());
    }
}
