//! Text cards, one per provider record.

use common::StatusRecord;
use rand::seq::SliceRandom;
use rand::Rng;

pub const SEPARATOR: &str = "———————————————";

/// Days shown for an active subscription whose expiry is unknown. Lands in
/// the healthy bucket.
const UNKNOWN_ACTIVE_DAYS: i64 = 9999;

// ── Quote pools ─────────────────────────────────────────────────────

const QUOTES_OK: &[&str] = &[
    "Binge responsibly.",
    "Queue it up.",
    "Another episode? Sure.",
    "Couch mode: engaged.",
    "Snacks on standby.",
    "Lights down, volume up.",
    "Plot thickens nicely.",
    "Pause is for cowards.",
    "Cliffhangers welcome.",
    "The remote is yours.",
    "Cozy blanket approved.",
    "Rewatch? Allowed.",
    "Trailers are dessert.",
    "Director's cut energy.",
    "Marathon pace: steady.",
    "Subtitles optional.",
    "Intro skipped, vibes kept.",
    "Popcorn forecast: sunny.",
    "One more, then sleep.",
    "Season finale ready.",
    "Weekend sorted.",
    "Chill level: maximum.",
    "Slippers on, worries off.",
    "The sequel can wait. Kidding.",
    "Buffering is a myth here.",
    "Cinema at home.",
    "Watchlist shrinking.",
    "Credits roll, next starts.",
    "Your sofa thanks you.",
    "Press play, forget Monday.",
];

const QUOTES_WARN: &[&str] = &[
    "Renew before the twist.",
    "A small fee, a long weekend.",
    "Top up, keep streaming.",
    "Plan ahead, binge later.",
    "Future you approves renewing.",
    "Keep the marathon going.",
    "Renew now, relax later.",
    "No intermissions, please.",
    "A quick renew saves a season.",
    "Don't let the reel run out.",
];

const QUOTES_CRIT: &[&str] = &[
    "Final act: renew.",
    "Countdown started.",
    "Almost out of runtime.",
    "Renew before the finale.",
    "Time is nearly up.",
    "Renew soon, please.",
    "Last call for the couch.",
    "The clock is ticking loudly.",
    "Three days of suspense.",
    "One tap keeps it rolling.",
    "Save your watch night.",
    "Hero move: renew today.",
    "The credits are near.",
    "Don't miss the ending.",
];

const QUOTES_EXPIRED: &[&str] = &[
    "Renew to continue.",
    "Intermission until renewal.",
    "The screen went dark.",
    "Subscription needed.",
    "Renew to press play again.",
    "Show paused indefinitely.",
    "Resubscribe, then binge.",
    "The projector is off.",
    "Your queue is waiting.",
    "Renew to unlock the couch.",
    "No ticket, no show.",
    "Top up to resume.",
    "The popcorn is getting cold.",
    "Renew now to keep watching.",
];

// ── Buckets ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Ok,
    Warning,
    Critical,
    Expired,
}

impl Bucket {
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d <= 0 => Bucket::Expired,
            d if d <= 3 => Bucket::Critical,
            d if d <= 14 => Bucket::Warning,
            _ => Bucket::Ok,
        }
    }

    fn mark(self) -> &'static str {
        match self {
            Bucket::Ok => "🟢",
            Bucket::Warning => "🟡",
            Bucket::Critical => "🟠",
            Bucket::Expired => "🔴",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Ok => "OK",
            Bucket::Warning => "Warning",
            Bucket::Critical => "Critical",
            Bucket::Expired => "Expired",
        }
    }

    pub fn quotes(self) -> &'static [&'static str] {
        match self {
            Bucket::Ok => QUOTES_OK,
            Bucket::Warning => QUOTES_WARN,
            Bucket::Critical => QUOTES_CRIT,
            Bucket::Expired => QUOTES_EXPIRED,
        }
    }
}

// ── Rendering ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub description: String,
}

pub fn render_card<R: Rng + ?Sized>(record: &StatusRecord, rng: &mut R) -> Card {
    let active = record.premium == Some(true);

    let (days_text, days) = match record.days_left {
        Some(d) => (d.to_string(), i64::from(d)),
        None if active => ("—".to_string(), UNKNOWN_ACTIVE_DAYS),
        None => ("0".to_string(), 0),
    };
    let bucket = Bucket::from_days(days);

    let user = record.username.as_deref().filter(|u| !u.is_empty()).unwrap_or("—");
    let until = match record.until {
        Some(t) => t.format("%Y-%m-%d").to_string(),
        None if active => "—".to_string(),
        None => "N/A".to_string(),
    };
    let quote = bucket.quotes().choose(rng).copied().unwrap_or_default();

    let description = [
        SEPARATOR.to_string(),
        format!("🤝 Service: {}", record.name),
        format!("👤 @{}", user),
        format!("⭐ Premium until: {}", until),
        format!("⏳ Days remaining: {} D", days_text),
        format!("{} Status: {}", bucket.mark(), bucket.label()),
        format!("💬 {}", quote),
        SEPARATOR.to_string(),
    ]
    .join("\n");

    Card {
        title: format!("{} {} — {}", bucket.mark(), bucket.label(), record.name),
        description,
    }
}
