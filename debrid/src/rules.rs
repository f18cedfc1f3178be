//! Declarative extraction rules for upstream account payloads.
//!
//! Each provider answers "is this account premium, who is it, and when does
//! it expire" with its own JSON shape. Adapters describe that shape as a
//! `DecisionTable`: ordered lists of JSON pointers and rules, probed in
//! declared precedence. A field counts as present under loose truthiness
//! (null, false, 0, "" and NaN are absent), matching how the upstream APIs
//! signal "not set".

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::expiry::{self, Remaining};

/// Numeric values at or below this are not plausible epoch timestamps.
pub const EPOCH_FLOOR_SECS: f64 = 1_000_000_000.0;

pub fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric reading of a value; numeric strings count.
pub fn as_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    n.filter(|f| f.is_finite())
}

/// First present value among `pointers` (RFC 6901, e.g. `/data/user`).
pub fn first_present<'a>(root: &'a Value, pointers: &[&str]) -> Option<&'a Value> {
    pointers
        .iter()
        .filter_map(|p| root.pointer(p))
        .find(|v| is_present(v))
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ── Rules ───────────────────────────────────────────────────────────

/// How an expiry field is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Epoch seconds.
    Epoch,
    /// Epoch seconds that must be strictly positive; zero or negative reads
    /// as unknown.
    PositiveEpoch,
    /// Epoch seconds when numeric and above `EPOCH_FLOOR_SECS`, otherwise a
    /// date string.
    EpochOrDate,
    /// Seconds remaining from now.
    Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct ExpiryRule {
    pub name: &'static str,
    /// Alternate spellings of the same field; the first present one is used.
    pub fields: &'static [&'static str],
    pub extraction: Extraction,
}

#[derive(Debug, Clone, Copy)]
pub enum PremiumRule {
    /// Field is literally `true`.
    FlagTrue(&'static str),
    /// Field is truthy.
    Flag(&'static str),
    /// Field is a string equal (case-insensitively) to the given value.
    Equals(&'static str, &'static str),
}

impl PremiumRule {
    fn holds(&self, obj: &Value) -> bool {
        match self {
            PremiumRule::FlagTrue(p) => obj.pointer(p) == Some(&Value::Bool(true)),
            PremiumRule::Flag(p) => obj.pointer(p).map_or(false, is_present),
            PremiumRule::Equals(p, expected) => obj
                .pointer(p)
                .and_then(Value::as_str)
                .map_or(false, |s| s.eq_ignore_ascii_case(expected)),
        }
    }
}

/// Which expiry rule decided, and what it produced. `remaining` is `None`
/// when the deciding field was present but unreadable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpiryMatch {
    pub rule: &'static str,
    pub remaining: Option<Remaining>,
}

/// The full extraction contract of one provider.
#[derive(Debug, Clone, Copy)]
pub struct DecisionTable {
    pub username: &'static [&'static str],
    pub premium: &'static [PremiumRule],
    pub expiry: &'static [ExpiryRule],
}

impl DecisionTable {
    pub fn username(&self, obj: &Value) -> Option<String> {
        first_present(obj, self.username).and_then(as_text)
    }

    /// Any premium rule holding marks the account premium.
    pub fn premium_flag(&self, obj: &Value) -> bool {
        self.premium.iter().any(|r| r.holds(obj))
    }

    /// The first expiry rule whose field is present decides; later rules are
    /// not consulted even if the deciding field turns out unreadable.
    pub fn expiry(&self, obj: &Value, now: DateTime<Utc>) -> Option<ExpiryMatch> {
        self.expiry.iter().find_map(|rule| {
            let raw = first_present(obj, rule.fields)?;
            Some(ExpiryMatch {
                rule: rule.name,
                remaining: extract(rule.extraction, raw, now),
            })
        })
    }

    pub fn remaining(&self, obj: &Value, now: DateTime<Utc>) -> Option<Remaining> {
        self.expiry(obj, now).and_then(|m| m.remaining)
    }
}

// A numeric `EpochOrDate` value at or below `EPOCH_FLOOR_SECS` is not a
// plausible timestamp and yields unknown days, as does any value that fails
// to parse. Unknown is never reported as 0 days.
fn extract(kind: Extraction, raw: &Value, now: DateTime<Utc>) -> Option<Remaining> {
    match kind {
        Extraction::Epoch => as_number(raw).map(|secs| expiry::from_absolute(secs, now)),
        Extraction::PositiveEpoch => as_number(raw)
            .filter(|secs| *secs > 0.0)
            .map(|secs| expiry::from_absolute(secs, now)),
        Extraction::Duration => as_number(raw).map(|secs| expiry::from_duration(secs, now)),
        Extraction::EpochOrDate => match as_number(raw) {
            Some(secs) if secs > EPOCH_FLOOR_SECS => Some(expiry::from_absolute(secs, now)),
            _ => raw.as_str().and_then(|s| expiry::from_date(s, now)),
        },
    }
}
