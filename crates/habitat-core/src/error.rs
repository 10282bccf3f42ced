//! Error types for `habitat-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Bad caller input (empty title, weekday out of range).
  #[error("validation error: {0}")]
  Validation(String),

  #[error("invalid date: {0}")]
  InvalidDate(String),

  #[error("habit not found: {0}")]
  HabitNotFound(Uuid),

  /// The storage backend failed; the operation left no partial writes.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
