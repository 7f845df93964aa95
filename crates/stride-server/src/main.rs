//! stride-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the Stride progress API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::FixedOffset;
use clap::Parser;
use serde::Deserialize;
use stride_core::{Engine, calendar::DayPolicy, engine::DEFAULT_DAILY_CHECKIN_XP};
use stride_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Stride progress & gamification server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `STRIDE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:               String,
  #[serde(default = "default_port")]
  port:               u16,
  #[serde(default = "default_store_path")]
  store_path:         PathBuf,
  /// Day-boundary offset from UTC in minutes; 0 keeps the canonical UTC
  /// policy. There is intentionally no per-user setting.
  #[serde(default)]
  utc_offset_minutes: i32,
  #[serde(default = "default_daily_checkin_xp")]
  daily_checkin_xp:   i64,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8319 }
fn default_store_path() -> PathBuf { PathBuf::from("stride.db") }
fn default_daily_checkin_xp() -> i64 { DEFAULT_DAILY_CHECKIN_XP }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("STRIDE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let policy = day_policy(server_cfg.utc_offset_minutes)?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let engine = Engine::new(store, policy)
    .with_daily_checkin_xp(server_cfg.daily_checkin_xp);

  let app = stride_api::api_router(Arc::new(engine))
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Translate the configured offset into the engine's single day policy.
fn day_policy(offset_minutes: i32) -> anyhow::Result<DayPolicy> {
  if offset_minutes == 0 {
    return Ok(DayPolicy::Utc);
  }
  let offset = FixedOffset::east_opt(offset_minutes * 60)
    .context("utc_offset_minutes out of range")?;
  Ok(DayPolicy::Fixed(offset))
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
