//! Manifest and stream-response shaping for the two host profiles.

use common::config::{
    DemoMode, Provider, DEBRIDLINK_AUTH_OPTIONS, DEFAULT_CACHE_MINUTES, DEFAULT_DEBRIDLINK_ENDPOINT,
    PREMIUMIZE_AUTH_OPTIONS,
};
use common::protocol::{ConfigField, Manifest, ManifestHints, Stream, StreamHints, StreamResponse};
use debrid::card::{render_card, SEPARATOR};
use debrid::{AggregateError, StatusReport};
use rand::Rng;

pub const ADDON_ID: &str = "a1337user.statusio.multi";
pub const STREAM_NAME: &str = "🔐 Statusio";
const TV_LINK: &str = "https://real-debrid.com/";
const ERROR_MAX_AGE_SECS: u64 = 60;

/// Which host flavor responses are shaped for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum HostProfile {
    Desktop,
    Tv,
}

fn option_labels<T>(options: &[(&str, &str, T)]) -> Vec<String> {
    options.iter().map(|(_, label, _)| label.to_string()).collect()
}

pub fn manifest() -> Manifest {
    let providers = ConfigField {
        multiple: Some(true),
        required: Some(false),
        ..ConfigField::select(
            "providers_enabled",
            "Which debrid services do you use?",
            Provider::ALL.iter().map(|p| p.label().to_string()).collect(),
        )
    };
    let cache_minutes = ConfigField {
        kind: "number".into(),
        ..ConfigField::text("cache_minutes", &format!("Cache Minutes (default {})", DEFAULT_CACHE_MINUTES))
    }
    .with_default(DEFAULT_CACHE_MINUTES);

    Manifest {
        id: ADDON_ID.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        name: "Statusio".into(),
        description: "Shows premium status & days remaining across multiple debrid providers.".into(),
        resources: vec!["stream".into()],
        types: ["movie", "series", "channel", "tv"].iter().map(|t| t.to_string()).collect(),
        id_prefixes: None,
        catalogs: Vec::new(),
        behavior_hints: ManifestHints { configurable: true, configuration_required: false },
        logo: None,
        config: vec![
            providers,
            cache_minutes,
            ConfigField::text("rd_token", "Real-Debrid Token (Bearer)"),
            ConfigField::text("ad_key", "AllDebrid API Key (Bearer)"),
            ConfigField::text("pm_key", "Premiumize apikey OR access_token"),
            ConfigField::select("pm_auth", "Premiumize Auth", option_labels(&PREMIUMIZE_AUTH_OPTIONS))
                .with_default(PREMIUMIZE_AUTH_OPTIONS[0].1),
            ConfigField::text("tb_token", "TorBox Token (Bearer)"),
            ConfigField::text("dl_key", "Debrid-Link API Key/Token"),
            ConfigField::select("dl_auth", "Debrid-Link Auth Scheme", option_labels(&DEBRIDLINK_AUTH_OPTIONS))
                .with_default(DEBRIDLINK_AUTH_OPTIONS[0].1),
            ConfigField::text("dl_endpoint", "Debrid-Link Endpoint (optional)")
                .with_default(DEFAULT_DEBRIDLINK_ENDPOINT),
            ConfigField::select(
                "demo_mode",
                "Demo Mode (simulate without real tokens)",
                option_labels(&DemoMode::OPTIONS),
            )
            .with_default(DemoMode::OPTIONS[0].1),
        ],
    }
}

fn info_stream(title: Option<String>, description: String, link: Option<&str>) -> Stream {
    Stream {
        name: STREAM_NAME.into(),
        title,
        description,
        url: link.map(str::to_string),
        external_url: link.unwrap_or("about:blank").to_string(),
        behavior_hints: StreamHints { not_web_ready: true },
    }
}

fn no_providers_stream() -> Stream {
    let mut lines = vec![SEPARATOR.to_string(), "Add a token in Configure:".to_string()];
    lines.extend(
        [
            (Provider::RealDebrid, "rd_token"),
            (Provider::AllDebrid, "ad_key"),
            (Provider::Premiumize, "pm_key"),
            (Provider::TorBox, "tb_token"),
            (Provider::DebridLink, "dl_key"),
        ]
        .iter()
        .map(|(p, field)| format!("• {} ({})", p.label(), field)),
    );
    lines.push(SEPARATOR.to_string());
    info_stream(Some("⚠️ No providers configured".into()), lines.join("\n"), None)
}

/// One card per renderable record, or the setup card when there is none.
pub fn desktop_response<R: Rng + ?Sized>(report: &StatusReport, ttl_secs: u64, rng: &mut R) -> StreamResponse {
    let mut streams: Vec<Stream> = report
        .renderable()
        .map(|r| {
            let card = render_card(r, rng);
            info_stream(Some(card.title), card.description, None)
        })
        .collect();
    if streams.is_empty() {
        streams.push(no_providers_stream());
    }
    StreamResponse::cached_for(streams, ttl_secs)
}

/// Informative records only, capped, no setup card.
pub fn tv_response<R: Rng + ?Sized>(report: &StatusReport, max_streams: usize, rng: &mut R) -> StreamResponse {
    if !report.has_data() {
        return StreamResponse::empty();
    }
    let streams = report
        .informative()
        .take(max_streams)
        .map(|r| info_stream(None, render_card(r, rng).description, Some(TV_LINK)))
        .collect();
    StreamResponse { streams, ..StreamResponse::empty() }
}

pub fn unavailable(err: &AggregateError) -> StreamResponse {
    let description = [
        SEPARATOR.to_string(),
        "⚠️ Unable to fetch debrid status".to_string(),
        err.to_string(),
        SEPARATOR.to_string(),
    ]
    .join("\n");
    StreamResponse {
        streams: vec![info_stream(Some("⚠️ Status unavailable".into()), description, None)],
        cache_max_age: Some(ERROR_MAX_AGE_SECS),
        ..StreamResponse::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::StatusRecord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    fn report(records: Vec<StatusRecord>) -> StatusReport {
        StatusReport { records }
    }

    #[test]
    fn test_manifest_shape() {
        let m = serde_json::to_value(manifest()).unwrap();
        assert_eq!(m["id"], ADDON_ID);
        assert_eq!(m["resources"], serde_json::json!(["stream"]));
        assert_eq!(m["behaviorHints"]["configurable"], true);
        let names: Vec<&str> = m["config"].as_array().unwrap().iter().map(|f| f["name"].as_str().unwrap()).collect();
        for field in ["providers_enabled", "cache_minutes", "rd_token", "pm_auth", "dl_endpoint", "demo_mode"] {
            assert!(names.contains(&field), "missing {}", field);
        }
        assert_eq!(m["config"][0]["options"].as_array().unwrap().len(), 5);
        assert_eq!(m["config"][1]["default"], 45);
    }

    #[test]
    fn test_desktop_skips_blank_and_sets_cache_hints() {
        let blank = StatusRecord { note: None, ..StatusRecord::unknown("X", "") };
        let r = report(vec![
            StatusRecord::active("Real-Debrid", Some(20), None, Some("neo".into())),
            blank,
            StatusRecord::unknown("TorBox", "HTTP 401"),
        ]);
        let resp = desktop_response(&r, 2700, &mut rng());
        assert_eq!(resp.streams.len(), 2);
        assert_eq!(resp.streams[0].title.as_deref(), Some("🟢 OK — Real-Debrid"));
        assert_eq!(resp.streams[0].external_url, "about:blank");
        assert!(resp.streams[0].behavior_hints.not_web_ready);
        assert_eq!(resp.cache_max_age, Some(2700));
        assert_eq!(resp.stale_revalidate, Some(2700));
        assert_eq!(resp.stale_error, Some(2700));
    }

    #[test]
    fn test_desktop_empty_shows_setup_card() {
        let resp = desktop_response(&report(vec![]), 60, &mut rng());
        assert_eq!(resp.streams.len(), 1);
        assert_eq!(resp.streams[0].title.as_deref(), Some("⚠️ No providers configured"));
        assert!(resp.streams[0].description.contains("• TorBox (tb_token)"));
    }

    #[test]
    fn test_tv_keeps_informative_and_caps() {
        let r = report(vec![
            StatusRecord::active("Real-Debrid", Some(20), None, None),
            StatusRecord::unknown("AllDebrid", "HTTP 500"),
            StatusRecord::inactive("Premiumize", None),
            StatusRecord::active("TorBox", Some(2), None, None),
            StatusRecord::active("Debrid-Link", Some(9), None, None),
        ]);
        let resp = tv_response(&r, 3, &mut rng());
        assert_eq!(resp.streams.len(), 3);
        assert!(resp.streams[1].description.contains("Premiumize"));
        assert_eq!(resp.streams[0].url.as_deref(), Some(TV_LINK));
        assert_eq!(resp.streams[0].external_url, TV_LINK);
        assert!(resp.streams[0].title.is_none());
        assert!(resp.cache_max_age.is_none());
    }

    #[test]
    fn test_tv_without_data_is_empty() {
        let r = report(vec![StatusRecord::unknown("TorBox", "missing credential")]);
        assert!(tv_response(&r, 3, &mut rng()).streams.is_empty());
    }
}
