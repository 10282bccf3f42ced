//! Handlers for `/habits` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/habits` | All habits, oldest first |
//! | `POST`  | `/habits` | Body: `{"title":"...","weekDays":[1,3,5]}`; returns 201 + habit |
//! | `GET`   | `/habits/:id` | 404 if not found |
//! | `PATCH` | `/habits/:id/toggle` | Optional `?date=`; defaults to today |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use habitat_core::{
  Tracker,
  habit::{Habit, NewHabit},
  ledger::CompletionState,
  store::HabitStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /habits`
pub async fn list<S>(
  State(tracker): State<Arc<Tracker<S>>>,
) -> Result<Json<Vec<Habit>>, ApiError>
where
  S: HabitStore,
{
  Ok(Json(tracker.list_habits().await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /habits` — body: `{"title":"Drink water","weekDays":[1,3,5]}`
///
/// `weekdays` is accepted as an alternative spelling of `weekDays`.
pub async fn create<S>(
  State(tracker): State<Arc<Tracker<S>>>,
  Json(body): Json<NewHabit>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HabitStore,
{
  let habit = tracker.register_habit(body).await?;
  Ok((StatusCode::CREATED, Json(habit)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /habits/:id`
pub async fn get_one<S>(
  State(tracker): State<Arc<Tracker<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Habit>, ApiError>
where
  S: HabitStore,
{
  Ok(Json(tracker.get_habit(id).await?))
}

// ─── Toggle ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ToggleParams {
  /// Day to toggle, as a date or timestamp. Defaults to today.
  pub date: Option<String>,
}

/// `PATCH /habits/:id/toggle[?date=<date>]`
///
/// Returns `{"completed": true}` when the habit is now marked done for that
/// day, `{"completed": false}` when the mark was removed.
pub async fn toggle<S>(
  State(tracker): State<Arc<Tracker<S>>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ToggleParams>,
) -> Result<Json<CompletionState>, ApiError>
where
  S: HabitStore,
{
  let day = match params.date.as_deref() {
    Some(s) => tracker.calendar().parse(s)?,
    None => tracker.calendar().today(),
  };
  Ok(Json(tracker.toggle_habit(day, id).await?))
}
