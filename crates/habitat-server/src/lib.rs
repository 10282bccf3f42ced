//! Server assembly for Habitat: configuration loading and the top-level
//! axum [`Router`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use config::{Config, ConfigBuilder, ConfigError, builder::DefaultState};
use habitat_core::{
  Tracker, calendar::Calendar, schedule::ActivationPolicy, store::HabitStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `habitat.toml` and
/// `HABITAT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Whether habits count on their registration day (`same_day`) or only
  /// from the next day on (`next_day`).
  pub activation:         ActivationPolicy,
  /// Offset east of UTC at which calendar days begin, in minutes.
  pub utc_offset_minutes: i32,
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn calendar(&self) -> habitat_core::Result<Calendar> {
    Calendar::with_offset_minutes(self.utc_offset_minutes)
  }

  /// `store_path` with a leading `~/` expanded to `$HOME`.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// A config builder pre-populated with every default.
pub fn config_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
  Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 3333)?
    .set_default("store_path", "habitat.db")?
    .set_default("activation", "next_day")?
    .set_default("utc_offset_minutes", 0)
}

/// Load configuration from `path` (optional) layered under `HABITAT_*`
/// environment variables.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
  config_defaults()?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("HABITAT"))
    .build()?
    .try_deserialize()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: the JSON API under `/api`, with request tracing.
pub fn app<S>(tracker: Arc<Tracker<S>>) -> Router
where
  S: HabitStore + 'static,
{
  Router::new()
    .nest("/api", habitat_api::api_router(tracker))
    .layer(TraceLayer::new_for_http())
}
