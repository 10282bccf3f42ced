//! Error type for `habitat-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  /// A `habit_weekdays` row holds an index outside 0..=6.
  #[error("unknown weekday index: {0}")]
  UnknownWeekday(i64),

  /// An aggregate count came back negative or too large for `u32`.
  #[error("invalid count: {0}")]
  InvalidCount(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
