//! JSON REST API for Habitat.
//!
//! Exposes an axum [`Router`] backed by a [`Tracker`] over any
//! [`habitat_core::store::HabitStore`]. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", habitat_api::api_router(tracker.clone()))
//! ```

pub mod days;
pub mod error;
pub mod habits;
pub mod summary;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch},
};
use habitat_core::{Tracker, store::HabitStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `tracker`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(tracker: Arc<Tracker<S>>) -> Router<()>
where
  S: HabitStore + 'static,
{
  Router::new()
    // Habits
    .route("/habits", get(habits::list::<S>).post(habits::create::<S>))
    .route("/habits/{id}", get(habits::get_one::<S>))
    .route("/habits/{id}/toggle", patch(habits::toggle::<S>))
    // Days
    .route("/day", get(days::handler::<S>))
    .route("/summary", get(summary::handler::<S>))
    .with_state(tracker)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use std::collections::BTreeSet;

  use chrono::{NaiveDate, TimeZone as _, Utc};
  use habitat_core::{
    habit::{Habit, NewHabit},
    ledger::{CompletionState, Day, DayTally},
  };
  use habitat_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn make_tracker() -> Arc<Tracker<SqliteStore>> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    Arc::new(Tracker::new(store))
  }

  async fn send(
    tracker: &Arc<Tracker<SqliteStore>>,
    method:  &str,
    uri:     &str,
    body:    Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = api_router(Arc::clone(tracker))
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
  }

  async fn create_habit(
    tracker:  &Arc<Tracker<SqliteStore>>,
    title:    &str,
    weekdays: &[i64],
  ) -> Value {
    let (status, body) = send(
      tracker,
      "POST",
      "/habits",
      Some(json!({ "title": title, "weekDays": weekdays })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
  }

  // ── Habits ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_habit_returns_201_with_deduplicated_weekdays() {
    let tracker = make_tracker().await;
    let before = json!(tracker.calendar().today().to_string());
    let body = create_habit(&tracker, "Drink water", &[5, 1, 3, 1]).await;
    let after = json!(tracker.calendar().today().to_string());

    assert_eq!(body["title"], "Drink water");
    assert_eq!(body["weekdays"], json!([1, 3, 5]));
    assert!(body["created_at"] == before || body["created_at"] == after);
    assert!(Uuid::parse_str(body["habit_id"].as_str().unwrap()).is_ok());
  }

  #[tokio::test]
  async fn create_habit_rejects_bad_input() {
    let tracker = make_tracker().await;

    for body in [
      json!({ "title": "", "weekDays": [1] }),
      json!({ "title": "Run", "weekDays": [7] }),
      json!({ "title": "Run", "weekdays": [-1] }),
    ] {
      let (status, resp) = send(&tracker, "POST", "/habits", Some(body)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert!(resp["error"].is_string());
    }

    let (_, list) = send(&tracker, "GET", "/habits", None).await;
    assert_eq!(list, json!([]));
  }

  #[tokio::test]
  async fn get_habit_and_list() {
    let tracker = make_tracker().await;
    let created = create_habit(&tracker, "Stretch", &[0, 6]).await;
    let id = created["habit_id"].as_str().unwrap();

    let (status, one) = send(&tracker, "GET", &format!("/habits/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one, created);

    let (status, list) = send(&tracker, "GET", "/habits", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([created]));
  }

  #[tokio::test]
  async fn get_unknown_habit_returns_404() {
    let tracker = make_tracker().await;
    let (status, body) =
      send(&tracker, "GET", &format!("/habits/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
  }

  // ── Day / toggle ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn day_toggle_and_summary_flow() {
    let tracker = make_tracker().await;
    let noon = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let habit = tracker
      .register_habit_at(NewHabit::new("Journal", 0..7), noon)
      .await
      .unwrap();
    let id = habit.habit_id.to_string();
    let tomorrow = "2024-01-02";

    // Not due on its creation day.
    let (status, view) = send(&tracker, "GET", "/day?date=2024-01-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["due_habits"], json!([]));
    assert_eq!(view["completed_habits"], json!([]));

    let (_, view) = send(&tracker, "GET", &format!("/day?date={tomorrow}"), None).await;
    assert_eq!(view["due_habits"], json!([id]));
    assert_eq!(view["completed_habits"], json!([]));

    let uri = format!("/habits/{id}/toggle?date={tomorrow}");
    let (status, state) = send(&tracker, "PATCH", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state, json!({ "completed": true }));

    let (_, view) = send(&tracker, "GET", &format!("/day?date={tomorrow}"), None).await;
    assert_eq!(view["completed_habits"], json!([id]));

    let (_, summary) = send(&tracker, "GET", "/summary", None).await;
    assert_eq!(summary.as_array().unwrap().len(), 1);
    assert_eq!(summary[0]["date"], json!(tomorrow));
    assert_eq!(summary[0]["completed"], json!(1));
    assert_eq!(summary[0]["due"], json!(1));

    let (_, state) = send(&tracker, "PATCH", &uri, None).await;
    assert_eq!(state, json!({ "completed": false }));

    let (_, summary) = send(&tracker, "GET", "/summary", None).await;
    assert_eq!(summary[0]["completed"], json!(0));
  }

  #[tokio::test]
  async fn toggle_defaults_to_today() {
    let tracker = make_tracker().await;
    let created = create_habit(&tracker, "Walk", &[1]).await;
    let id = created["habit_id"].as_str().unwrap();

    let before = json!(tracker.calendar().today().to_string());
    let (status, state) =
      send(&tracker, "PATCH", &format!("/habits/{id}/toggle"), None).await;
    let after = json!(tracker.calendar().today().to_string());
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state, json!({ "completed": true }));

    let (_, summary) = send(&tracker, "GET", "/summary", None).await;
    assert_eq!(summary.as_array().unwrap().len(), 1);
    assert!(summary[0]["date"] == before || summary[0]["date"] == after);
  }

  #[tokio::test]
  async fn toggle_unknown_habit_returns_404_without_ledger_row() {
    let tracker = make_tracker().await;
    let uri = format!("/habits/{}/toggle?date=2024-01-03", Uuid::new_v4());
    let (status, _) = send(&tracker, "PATCH", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, summary) = send(&tracker, "GET", "/summary", None).await;
    assert_eq!(summary, json!([]));
  }

  #[tokio::test]
  async fn invalid_dates_return_400() {
    let tracker = make_tracker().await;
    let created = create_habit(&tracker, "Walk", &[1]).await;
    let id = created["habit_id"].as_str().unwrap();

    let (status, body) = send(&tracker, "GET", "/day?date=not-a-date", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not-a-date"));

    let uri = format!("/habits/{id}/toggle?date=2024-02-30");
    let (status, _) = send(&tracker, "PATCH", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn day_requires_date_param() {
    let tracker = make_tracker().await;
    let (status, _) = send(&tracker, "GET", "/day", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn day_reports_weekday_index() {
    let tracker = make_tracker().await;
    // 2024-01-07 is a Sunday.
    let (status, view) = send(&tracker, "GET", "/day?date=2024-01-07T10:00:00Z", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["date"], json!("2024-01-07"));
    assert_eq!(view["weekday"], json!(0));
  }

  #[tokio::test]
  async fn day_accepts_unescaped_positive_offset() {
    let tracker = make_tracker().await;
    // `+` form-decodes to a space; 01:30+02:00 is still the previous UTC day.
    let (status, view) =
      send(&tracker, "GET", "/day?date=2024-01-03T01:30:00+02:00", None).await;
    assert_eq!(status, StatusCode::OK, "{view}");
    assert_eq!(view["date"], json!("2024-01-02"));

    let (status, view) =
      send(&tracker, "GET", "/day?date=2024-01-03T01:30:00%2B02:00", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["date"], json!("2024-01-02"));
  }

  // ── Storage failures ────────────────────────────────────────────────────────

  /// A backend whose every call fails.
  struct FailingStore;

  fn disk_error() -> std::io::Error { std::io::Error::other("disk unavailable") }

  impl HabitStore for FailingStore {
    type Error = std::io::Error;

    async fn insert_habit(&self, _: Habit) -> Result<Habit, Self::Error> {
      Err(disk_error())
    }

    async fn get_habit(&self, _: Uuid) -> Result<Option<Habit>, Self::Error> {
      Err(disk_error())
    }

    async fn list_habits(&self) -> Result<Vec<Habit>, Self::Error> { Err(disk_error()) }

    async fn find_day(&self, _: NaiveDate) -> Result<Option<Day>, Self::Error> {
      Err(disk_error())
    }

    async fn get_or_create_day(&self, _: NaiveDate) -> Result<Day, Self::Error> {
      Err(disk_error())
    }

    async fn completed_habits(
      &self,
      _: NaiveDate,
    ) -> Result<BTreeSet<Uuid>, Self::Error> {
      Err(disk_error())
    }

    async fn toggle_completion(
      &self,
      _: NaiveDate,
      _: Uuid,
    ) -> Result<Option<CompletionState>, Self::Error> {
      Err(disk_error())
    }

    async fn day_tallies(&self) -> Result<Vec<DayTally>, Self::Error> { Err(disk_error()) }
  }

  #[tokio::test]
  async fn storage_failure_returns_500_with_error_body() {
    let router = api_router(Arc::new(Tracker::new(FailingStore)));
    let toggle = format!("/habits/{}/toggle?date=2024-01-03", Uuid::new_v4());

    for (method, uri, body) in [
      ("GET", "/habits", None),
      ("POST", "/habits", Some(json!({ "title": "Run", "weekDays": [1] }))),
      ("GET", "/day?date=2024-01-03", None),
      ("PATCH", toggle.as_str(), None),
      ("GET", "/summary", None),
    ] {
      let mut builder = Request::builder().method(method).uri(uri);
      let body = match body {
        Some(v) => {
          builder = builder.header(header::CONTENT_TYPE, "application/json");
          Body::from(v.to_string())
        }
        None => Body::empty(),
      };
      let resp = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
      assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");

      let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
      let value: Value = serde_json::from_slice(&bytes).unwrap();
      assert!(
        value["error"].as_str().unwrap().contains("disk unavailable"),
        "{method} {uri}: {value}"
      );
    }
  }
}
