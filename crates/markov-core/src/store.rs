//! The `ChainStore` trait.
//!
//! Implemented by storage backends (e.g. `markov-store-sqlite`). The
//! ingestion pipeline and generation engine depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use rand::Rng;

use crate::{
  chain::{ChainStats, Prefix, PrefixId, Suffix},
  tuple::Tuple,
};

/// Abstraction over a persistent Markov chain backend.
///
/// Prefixes and suffixes are never deleted; suffix counts only grow. Backend
/// errors convert into [`crate::Error`] so that the `NoMatch`/`NoSuffix`
/// conditions stay distinguishable from storage failures.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded tokio runtimes and spawned tasks.
pub trait ChainStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Return the id of the `(tuple, author)` prefix, creating it on first
  /// observation. The prefix order is the tuple's order.
  ///
  /// Concurrent callers with the same pair all receive the same id and
  /// exactly one record exists afterwards.
  fn upsert_prefix<'a>(
    &'a self,
    tuple: &'a Tuple,
    author: &'a str,
  ) -> impl Future<Output = Result<PrefixId, Self::Error>> + Send + 'a;

  /// Record one observation of `word` following `prefix_id`: insert it with a
  /// count of 1, or add 1 to the existing count. Returns the updated record.
  fn increment_suffix<'a>(
    &'a self,
    prefix_id: PrefixId,
    word: &'a str,
  ) -> impl Future<Output = Result<Suffix, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Every prefix whose tuple contains `word` as a token, ordered by id.
  /// Fails with [`crate::Error::NoMatch`] when nothing matches.
  ///
  /// Tokens follow the backend's search tokenizer, not whitespace splitting, so
  /// a punctuation-only word such as `,` may never match.
  fn find_prefixes_containing<'a>(
    &'a self,
    word: &'a str,
  ) -> impl Future<Output = Result<Vec<Prefix>, Self::Error>> + Send + 'a;

  /// Exact lookup of a window, preferring `author`'s prefix and otherwise
  /// falling back to the oldest prefix with the same words.
  fn lookup_prefix<'a>(
    &'a self,
    tuple: &'a Tuple,
    author: &'a str,
  ) -> impl Future<Output = Result<Option<Prefix>, Self::Error>> + Send + 'a;

  /// A prefix chosen uniformly among those stored. Fails with
  /// [`crate::Error::EmptyChain`] on an empty store.
  fn random_prefix<'a, R: Rng + Send>(
    &'a self,
    rng: &'a mut R,
  ) -> impl Future<Output = Result<Prefix, Self::Error>> + Send + 'a;

  /// A suffix of `prefix_id` chosen with probability proportional to its
  /// count. Fails with [`crate::Error::NoSuffix`] when there is none.
  fn random_suffix<'a, R: Rng + Send>(
    &'a self,
    prefix_id: PrefixId,
    rng: &'a mut R,
  ) -> impl Future<Output = Result<Suffix, Self::Error>> + Send + 'a;

  /// All suffixes of `prefix_id`, ordered by id.
  fn suffixes_of(
    &self,
    prefix_id: PrefixId,
  ) -> impl Future<Output = Result<Vec<Suffix>, Self::Error>> + Send + '_;

  fn stats(&self) -> impl Future<Output = Result<ChainStats, Self::Error>> + Send + '_;
}
