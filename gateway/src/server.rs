//! HTTP surface: one catch-all handler that authorizes, routes and shapes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use common::protocol::{Manifest, StreamResponse};
use common::{AddonConfig, EnvCredentials};
use debrid::StatusService;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::SecretGuard;
use crate::routes::{self, Route};
use crate::stremio::{self, HostProfile};

#[derive(Clone)]
pub struct AppState {
    pub service: StatusService,
    pub env: Arc<EnvCredentials>,
    pub guard: Arc<SecretGuard>,
    pub profile: HostProfile,
    pub max_tv_streams: usize,
    pub public_url: Option<String>,
    pub manifest: Arc<Manifest>,
}

pub fn router(state: AppState) -> Router {
    // Paths carry credentials, so spans only record the method.
    let trace = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| tracing::info_span!("request", method = %req.method()));

    Router::new()
        .route("/", get(dispatch))
        .route("/*path", get(dispatch))
        .layer(trace)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn dispatch(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    let segments = routes::split_path(uri.path());
    let Ok(rest) = state.guard.admit(&segments) else {
        warn!("Rejected request without a valid access secret");
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response();
    };

    match Route::parse(rest) {
        Some(Route::Root) => root(&state, &headers).into_response(),
        Some(Route::Manifest { .. }) => Json(state.manifest.as_ref().clone()).into_response(),
        Some(Route::Stream { config, kind, id }) => Json(stream(&state, config, &kind, &id).await).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

fn root(state: &AppState, headers: &HeaderMap) -> Json<serde_json::Value> {
    let origin = state
        .public_url
        .clone()
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(|host| format!("http://{}", host))
        })
        .unwrap_or_default();
    let path = match state.guard.secret() {
        Some(secret) => format!("/{}/manifest.json", secret),
        None => "/manifest.json".to_string(),
    };
    Json(json!({
        "name": "Statusio",
        "version": env!("CARGO_PKG_VERSION"),
        "manifest": format!("{}{}", origin.trim_end_matches('/'), path),
    }))
}

fn decode_config(raw: Option<&str>, request_id: &Uuid) -> AddonConfig {
    let Some(raw) = raw else {
        return AddonConfig::default();
    };
    AddonConfig::decode(raw).unwrap_or_else(|e| {
        warn!(request_id = %request_id, "Ignoring config: {}", e);
        AddonConfig::default()
    })
}

async fn stream(state: &AppState, path_config: Option<String>, kind: &str, id: &str) -> StreamResponse {
    let request_id = Uuid::new_v4();
    let (content_id, id_config) = routes::split_stream_id(id);
    let raw = path_config.as_deref().or(id_config);
    let cfg = decode_config(raw, &request_id).resolve(&state.env);

    info!(
        request_id = %request_id,
        kind = %kind,
        providers = cfg.enabled.len(),
        demo = %cfg.demo.id(),
        "Stream request"
    );

    if state.profile == HostProfile::Tv {
        if !content_id.starts_with("tt") {
            return StreamResponse::empty();
        }
        if !cfg.has_enabled() && cfg.demo.is_off() {
            return StreamResponse::empty();
        }
    }

    let report = match state.service.report(&cfg).await {
        Ok(report) => report,
        Err(e) => {
            error!(request_id = %request_id, "Status aggregation failed: {}", e);
            return stremio::unavailable(&e);
        }
    };

    let mut rng = rand::thread_rng();
    match state.profile {
        HostProfile::Desktop => stremio::desktop_response(&report, cfg.cache_ttl().as_secs(), &mut rng),
        HostProfile::Tv => stremio::tv_response(&report, state.max_tv_streams, &mut rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use debrid::{AdapterRegistry, MemoryCache};
    use tower::ServiceExt;

    const ALL_ACTIVE_B64: &str = "eyJkZW1vX21vZGUiOiJhbGxfYWN0aXZlIn0=";
    const SOME_OFF_B64: &str = "eyJkZW1vX21vZGUiOiJzb21lX29mZiJ9";

    fn state(profile: HostProfile, secret: Option<&str>) -> AppState {
        AppState {
            service: StatusService::new(AdapterRegistry::new(), Arc::new(MemoryCache::new())),
            env: Arc::new(EnvCredentials::default()),
            guard: Arc::new(SecretGuard::new(secret.map(str::to_string))),
            profile,
            max_tv_streams: 3,
            public_url: None,
            manifest: Arc::new(stremio::manifest()),
        }
    }

    async fn get_json(app: Router, path: &str) -> (StatusCode, serde_json::Value) {
        let req = axum::http::Request::builder()
            .uri(path)
            .header("host", "addon.test")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_root_document() {
        let (status, body) = get_json(router(state(HostProfile::Desktop, None)), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Statusio");
        assert_eq!(body["manifest"], "http://addon.test/manifest.json");
    }

    #[tokio::test]
    async fn test_root_document_includes_secret() {
        let (_, body) = get_json(router(state(HostProfile::Desktop, Some("s3"))), "/s3").await;
        assert_eq!(body["manifest"], "http://addon.test/s3/manifest.json");
    }

    #[tokio::test]
    async fn test_secret_required() {
        let app = router(state(HostProfile::Desktop, Some("s3")));
        let (status, body) = get_json(app.clone(), "/manifest.json").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Unauthorized" }));

        let (status, _) = get_json(app.clone(), "/wrong/manifest.json").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = get_json(app, "/s3/manifest.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], stremio::ADDON_ID);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (status, _) = get_json(router(state(HostProfile::Desktop, None)), "/catalog/movie/x.json").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_manifest_with_config_segment() {
        let path = format!("/{}/manifest", SOME_OFF_B64);
        let (status, body) = get_json(router(state(HostProfile::Desktop, None)), &path).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Statusio");
    }

    #[tokio::test]
    async fn test_desktop_without_config_shows_setup_card() {
        let (status, body) = get_json(router(state(HostProfile::Desktop, None)), "/stream/movie/tt1.json").await;
        assert_eq!(status, StatusCode::OK);
        let streams = body["streams"].as_array().unwrap();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0]["title"], "⚠️ No providers configured");
        assert_eq!(body["cacheMaxAge"], 2700);
    }

    #[tokio::test]
    async fn test_desktop_demo_from_path_config() {
        let path = format!("/{}/stream/movie/tt1.json", SOME_OFF_B64);
        let (_, body) = get_json(router(state(HostProfile::Desktop, None)), &path).await;
        let streams = body["streams"].as_array().unwrap();
        assert_eq!(streams.len(), 5);
        assert_eq!(streams[0]["name"], stremio::STREAM_NAME);
        assert_eq!(streams[0]["externalUrl"], "about:blank");
        assert_eq!(streams[0]["behaviorHints"]["notWebReady"], true);
        assert!(streams[2]["title"].as_str().unwrap().starts_with("🔴 Expired"));
    }

    #[tokio::test]
    async fn test_desktop_demo_from_id_config() {
        let path = format!("/stream/series/tt1:{}.json", ALL_ACTIVE_B64);
        let (_, body) = get_json(router(state(HostProfile::Desktop, None)), &path).await;
        assert_eq!(body["streams"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_desktop_undecodable_config_falls_back() {
        let (status, body) =
            get_json(router(state(HostProfile::Desktop, None)), "/%21%21%21/stream/movie/tt1.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["streams"][0]["title"], "⚠️ No providers configured");
    }

    #[tokio::test]
    async fn test_tv_profile() {
        let app = router(state(HostProfile::Tv, None));

        let (_, body) = get_json(app.clone(), &format!("/{}/stream/tv/channel1.json", ALL_ACTIVE_B64)).await;
        assert!(body["streams"].as_array().unwrap().is_empty());

        let (_, body) = get_json(app.clone(), "/stream/movie/tt1.json").await;
        assert!(body["streams"].as_array().unwrap().is_empty());

        let (_, body) = get_json(app, &format!("/{}/stream/movie/tt1.json", ALL_ACTIVE_B64)).await;
        let streams = body["streams"].as_array().unwrap();
        assert_eq!(streams.len(), 3);
        assert_eq!(streams[0]["url"], "https://real-debrid.com/");
        assert!(body.get("cacheMaxAge").is_none());
    }
}
