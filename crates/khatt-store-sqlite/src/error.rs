//! Error type for `khatt-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] khatt_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A mutation referenced a line id that does not exist.
  #[error("line not found: {0}")]
  LineNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
