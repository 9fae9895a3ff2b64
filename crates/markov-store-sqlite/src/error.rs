//! Error type for `markov-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] markov_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A stored row could not be decoded into a chain record.
  #[error("corrupt row: {0}")]
  Corrupt(String),
}

impl From<Error> for markov_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(e) => e,
      other => markov_core::Error::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
