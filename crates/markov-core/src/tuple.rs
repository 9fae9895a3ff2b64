//! Tuple — the fixed-length word window used as Markov state.
//!
//! A tuple's canonical form is its words joined by a single space. That string
//! is both the persisted encoding and the search key.

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Which end of a [`Tuple`] a new word enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  /// Drop the first word, append at the end.
  Forward,
  /// Drop the last word, insert at the front.
  Backward,
}

/// An ordered window of exactly `order` words.
///
/// The length is fixed at construction; [`Tuple::shift`] slides the window
/// without changing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Tuple {
  words: Vec<String>,
}

impl Tuple {
  /// A tuple of `order` empty words.
  pub fn new(order: usize) -> Self {
    Self { words: vec![String::new(); order] }
  }

  pub fn from_words<I, S>(words: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self { words: words.into_iter().map(Into::into).collect() }
  }

  pub fn order(&self) -> usize { self.words.len() }

  pub fn words(&self) -> &[String] { &self.words }

  /// Slide `word` into the window from the given direction.
  pub fn shift(&mut self, word: impl Into<String>, direction: Direction) {
    if self.words.is_empty() {
      return;
    }
    let word = word.into();
    match direction {
      Direction::Forward => {
        self.words.rotate_left(1);
        if let Some(last) = self.words.last_mut() {
          *last = word;
        }
      }
      Direction::Backward => {
        self.words.rotate_right(1);
        self.words[0] = word;
      }
    }
  }

  /// Canonical space-joined form.
  pub fn encode(&self) -> String { self.words.join(" ") }

  /// Inverse of [`Tuple::encode`]. The order of the result is the number of
  /// whitespace-separated fields, so only well-formed encodings round-trip.
  pub fn decode(s: &str) -> Self { Self::from_words(s.split_whitespace()) }
}

impl fmt::Display for Tuple {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.encode())
  }
}

impl FromStr for Tuple {
  type Err = Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self::decode(s)) }
}

impl From<Tuple> for String {
  fn from(t: Tuple) -> Self { t.encode() }
}

impl From<String> for Tuple {
  fn from(s: String) -> Self { Self::decode(&s) }
}
