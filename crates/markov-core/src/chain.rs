//! Prefix and suffix records — the persisted shape of the chain.
//!
//! A prefix is a tuple attributed to an author. Each prefix owns a set of
//! suffixes, the words observed directly after it, with occurrence counts.
//! Records are plain values; backends map their rows into these types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tuple::Tuple;

/// Store-assigned identifier of a prefix record.
pub type PrefixId = i64;

/// Store-assigned identifier of a suffix record.
pub type SuffixId = i64;

/// A stored prefix. `(tuple, author)` is unique within a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefix {
  pub id:     PrefixId,
  pub tuple:  Tuple,
  pub order:  usize,
  pub author: String,
}

impl Prefix {
  /// The prefix words as an owned list, detached from the record.
  pub fn words(&self) -> Vec<String> { self.tuple.words().to_vec() }
}

impl fmt::Display for Prefix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}({}): {}", self.author, self.order, self.tuple)
  }
}

/// A word observed after a prefix. `(prefix_id, word)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suffix {
  pub id:        SuffixId,
  pub prefix_id: PrefixId,
  pub word:      String,
  /// Number of times `word` followed the prefix. Always at least 1.
  pub count:     u64,
}

impl fmt::Display for Suffix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}({})", self.word, self.count)
  }
}

/// Aggregate size of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChainStats {
  pub prefixes:     u64,
  pub suffixes:     u64,
  /// Sum of all suffix counts, i.e. the number of ingested transitions.
  pub observations: u64,
}
