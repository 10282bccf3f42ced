//! Handler for `GET /summary`.

use std::sync::Arc;

use axum::{Json, extract::State};
use habitat_core::{Tracker, ledger::DaySummary, store::HabitStore};

use crate::error::ApiError;

/// `GET /summary` — one `{day_id, date, completed, due}` row per ledger day,
/// ordered by date ascending.
pub async fn handler<S>(
  State(tracker): State<Arc<Tracker<S>>>,
) -> Result<Json<Vec<DaySummary>>, ApiError>
where
  S: HabitStore,
{
  Ok(Json(tracker.summary().await?))
}
