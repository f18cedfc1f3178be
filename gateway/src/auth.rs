//! Optional access secret, carried as the first path segment.
//!
//! When a secret is configured every request must start with
//! `/<secret>/...`; the segment is stripped before routing.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Unauthorized")]
pub struct Unauthorized;

pub struct SecretGuard {
    secret: Option<String>,
    /// Per-process MAC key for comparisons.
    key: [u8; 32],
}

impl SecretGuard {
    /// A blank secret disables the guard.
    pub fn new(secret: Option<String>) -> Self {
        let secret = secret.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let mut key = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut key);
        Self { secret, key }
    }

    pub fn open() -> Self {
        Self::new(None)
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    /// Check the leading segment and return the path segments after it.
    pub fn admit<'a>(&self, segments: &'a [String]) -> Result<&'a [String], Unauthorized> {
        let Some(secret) = &self.secret else {
            return Ok(segments);
        };
        match segments.split_first() {
            Some((first, rest)) if constant_time_eq(&self.key, first, secret) => Ok(rest),
            _ => Err(Unauthorized),
        }
    }
}

fn tag(key: &[u8], s: &str) -> Option<[u8; 32]> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(s.as_bytes());
    Some(mac.finalize().into_bytes().into())
}

/// Compare two strings in constant time by comparing fixed-length MACs of
/// both, so neither length nor common prefix leaks through timing.
fn constant_time_eq(key: &[u8], a: &str, b: &str) -> bool {
    match (tag(key, a), tag(key, b)) {
        (Some(ta), Some(tb)) => ta.iter().zip(tb.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_constant_time_eq_matching() {
        let key = [7u8; 32];
        assert!(constant_time_eq(&key, "abc123", "abc123"));
        assert!(constant_time_eq(&key, "", ""));
    }

    #[test]
    fn test_constant_time_eq_not_matching() {
        let key = [7u8; 32];
        assert!(!constant_time_eq(&key, "abc123", "abc124"));
        assert!(!constant_time_eq(&key, "abc", "abcd"));
        assert!(!constant_time_eq(&key, "abc123", ""));
    }

    #[test]
    fn test_open_guard_passes_everything() {
        let guard = SecretGuard::open();
        let path = segs(&["manifest.json"]);
        assert_eq!(guard.admit(&path).unwrap(), &path[..]);
        assert!(guard.admit(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_blank_secret_disables_guard() {
        let guard = SecretGuard::new(Some("   ".into()));
        assert!(guard.secret().is_none());
    }

    #[test]
    fn test_secret_is_stripped() {
        let guard = SecretGuard::new(Some("s3cret".into()));
        let path = segs(&["s3cret", "stream", "movie", "tt1.json"]);
        assert_eq!(guard.admit(&path).unwrap(), &path[1..]);

        let root = segs(&["s3cret"]);
        assert!(guard.admit(&root).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_or_missing_secret_rejected() {
        let guard = SecretGuard::new(Some("s3cret".into()));
        assert_eq!(guard.admit(&segs(&["nope", "manifest.json"])), Err(Unauthorized));
        assert_eq!(guard.admit(&segs(&["manifest.json"])), Err(Unauthorized));
        assert_eq!(guard.admit(&[]), Err(Unauthorized));
    }
}
