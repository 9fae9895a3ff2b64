//! Error types for `markov-core`.

use std::time::Duration;

use thiserror::Error;

use crate::chain::PrefixId;

#[derive(Debug, Error)]
pub enum Error {
  /// No stored prefix contains the seed word.
  #[error("no prefix matches {0:?}")]
  NoMatch(String),

  /// The prefix has no recorded successor. Generation treats this as the end
  /// of the walk; it never reaches the user.
  #[error("prefix {0} has no suffixes")]
  NoSuffix(PrefixId),

  /// A random prefix was requested from a store with no prefixes.
  #[error("the chain is empty")]
  EmptyChain,

  #[error("line {line}: expected `author content`, got {text:?}")]
  MalformedInput { line: usize, text: String },

  #[error("chain order must be at least 1, got {0}")]
  InvalidOrder(usize),

  #[error("ingestion timed out after {0:?}")]
  Timeout(Duration),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
