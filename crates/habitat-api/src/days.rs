//! Handler for `GET /day`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use habitat_core::{Tracker, ledger::DayView, store::HabitStore};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct DayParams {
  /// A date (`2024-01-03`) or timestamp; required. A positive UTC offset may
  /// be sent as `%2B02:00` or with a bare `+`.
  pub date: String,
}

/// `GET /day?date=<date>` — due and completed habit ids for that day.
pub async fn handler<S>(
  State(tracker): State<Arc<Tracker<S>>>,
  Query(params): Query<DayParams>,
) -> Result<Json<DayView>, ApiError>
where
  S: HabitStore,
{
  let day = tracker.calendar().parse(&params.date)?;
  Ok(Json(tracker.get_day(day).await?))
}
