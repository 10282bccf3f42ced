//! habitat server binary.
//!
//! Reads `habitat.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the JSON API under `/api`.
//!
//! Every config key can be overridden with a `HABITAT_`-prefixed environment
//! variable, e.g. `HABITAT_PORT=8080`.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use habitat_core::Tracker;
use habitat_server::load_config;
use habitat_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Habitat habit tracker server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "habitat.toml")]
  config: PathBuf,
}

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

  let server_cfg = load_config(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let calendar = server_cfg.calendar().context("invalid utc_offset_minutes")?;
  let store_path = server_cfg.resolved_store_path();

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let tracker = Tracker::new(store)
    .with_calendar(calendar)
    .with_policy(server_cfg.activation);

  let app = habitat_server::app(Arc::new(tracker));
  let address = server_cfg.address();

  tracing::info!(
    store = %store_path.display(),
    activation = ?server_cfg.activation,
    utc_offset_minutes = server_cfg.utc_offset_minutes,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}
