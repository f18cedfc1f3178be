//! Statusio: Stremio add-on reporting premium status across debrid
//! services.
//!
//! Serves the manifest and info-only stream cards over HTTP. Provider
//! results are cached per configuration, in memory or in Redis.

use anyhow::{Context, Result};
use clap::Parser;
use common::EnvCredentials;
use debrid::{AdapterRegistry, KvCache, MemoryCache, RedisStore, StatusCache, StatusService};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod auth;
mod routes;
mod server;
mod stremio;

use stremio::HostProfile;

const PURGE_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,
    #[arg(long, env = "PORT", default_value_t = 7042)]
    port: u16,
    /// Require this value as the first path segment.
    #[arg(long, env = "ACCESS_SECRET", hide_env_values = true)]
    access_secret: Option<String>,
    /// Cache results in Redis instead of process memory.
    #[arg(long, env = "REDIS_URL", hide_env_values = true)]
    redis_url: Option<String>,
    #[arg(long, env = "HOST_PROFILE", value_enum, default_value_t = HostProfile::Desktop)]
    profile: HostProfile,
    #[arg(long, env = "MAX_TV_STREAMS", default_value_t = 3)]
    max_tv_streams: usize,
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 8)]
    upstream_timeout_secs: u64,
    /// Public origin used in the root document, e.g. https://statusio.example.
    #[arg(long, env = "PUBLIC_URL")]
    public_url: Option<String>,
    #[arg(long)]
    log_json: bool,

    #[arg(long, env = "RD_TOKEN", hide_env_values = true)]
    rd_token: Option<String>,
    #[arg(long, env = "AD_KEY", hide_env_values = true)]
    ad_key: Option<String>,
    #[arg(long, env = "PM_KEY", hide_env_values = true)]
    pm_key: Option<String>,
    #[arg(long, env = "TB_TOKEN", hide_env_values = true)]
    tb_token: Option<String>,
    #[arg(long, env = "DL_KEY", hide_env_values = true)]
    dl_key: Option<String>,
}

impl Args {
    fn env_credentials(&self) -> EnvCredentials {
        EnvCredentials {
            rd_token: self.rd_token.clone(),
            ad_key: self.ad_key.clone(),
            pm_key: self.pm_key.clone(),
            tb_token: self.tb_token.clone(),
            dl_key: self.dl_key.clone(),
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "gateway=info,debrid=info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.log_json);

    info!("🔐 Statusio v{}", env!("CARGO_PKG_VERSION"));

    // ── Result cache ────────────────────────────────────────────────
    let cache: Arc<dyn StatusCache> = match &args.redis_url {
        Some(url) => {
            let store = RedisStore::connect(url).await.context("Failed to connect to Redis")?;
            Arc::new(KvCache::new(store))
        }
        None => {
            let memory = Arc::new(MemoryCache::new());
            let purger = Arc::clone(&memory);
            tokio::spawn(async move {
                let mut tick = tokio::time::interval(PURGE_INTERVAL);
                loop {
                    tick.tick().await;
                    let removed = purger.purge_expired().await;
                    if removed > 0 {
                        debug!(removed, "Purged expired cache entries");
                    }
                }
            });
            info!("Using in-memory result cache");
            memory
        }
    };

    // ── Adapters ────────────────────────────────────────────────────
    let client = debrid::adapters::http_client(Duration::from_secs(args.upstream_timeout_secs))
        .context("Failed to build HTTP client")?;
    let registry = AdapterRegistry::standard(client);

    let env = args.env_credentials();
    let fallbacks: Vec<&str> = common::Provider::ALL
        .iter()
        .filter(|p| env.get(**p).is_some())
        .map(|p| p.id())
        .collect();
    if !fallbacks.is_empty() {
        info!(providers = ?fallbacks, "Environment credential fallbacks configured");
    }

    let state = server::AppState {
        service: StatusService::new(registry, cache),
        env: Arc::new(env),
        guard: Arc::new(auth::SecretGuard::new(args.access_secret.clone())),
        profile: args.profile,
        max_tv_streams: args.max_tv_streams,
        public_url: args.public_url.clone(),
        manifest: Arc::new(stremio::manifest()),
    };
    if state.guard.secret().is_some() {
        info!("Access secret required on every path");
    }

    let app = server::router(state);
    let addr = SocketAddr::new(args.host, args.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(profile = ?args.profile, "Statusio listening on http://{}/manifest.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Server error")?;
    Ok(())
}
