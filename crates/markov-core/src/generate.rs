//! Generation engine — a weighted random walk over a [`ChainStore`].
//!
//! The walk starts from a prefix matching the first seed word, or from a
//! uniformly random prefix when no seed is given, and keeps sampling suffixes
//! until the current window has none.

use rand::{SeedableRng, rngs::StdRng};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{
  Error, Result,
  chain::Prefix,
  store::ChainStore,
  tuple::Direction,
};

pub struct Generator<'s, S> {
  store:     &'s S,
  rng:       StdRng,
  max_words: Option<usize>,
}

impl<'s, S: ChainStore> Generator<'s, S> {
  pub fn new(store: &'s S) -> Self {
    Self { store, rng: StdRng::from_entropy(), max_words: None }
  }

  /// A generator whose walks are fully determined by `seed` and the store
  /// contents.
  pub fn seeded(store: &'s S, seed: u64) -> Self {
    Self { store, rng: StdRng::seed_from_u64(seed), max_words: None }
  }

  /// Stop after `limit` words even if the chain continues.
  pub fn with_max_words(mut self, limit: usize) -> Self {
    self.max_words = Some(limit);
    self
  }

  /// Generate text and write it to `out` as one space-joined string.
  pub async fn generate<W, T>(&mut self, out: &mut W, seeds: &[T]) -> Result<()>
  where
    W: AsyncWrite + Unpin,
    T: AsRef<str>,
  {
    let text = self.generate_string(seeds).await?;
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
  }

  pub async fn generate_string<T: AsRef<str>>(&mut self, seeds: &[T]) -> Result<String> {
    let start = self.seek(seeds).await?;
    tracing::debug!(prefix = %start, "walk started");

    let words = self.walk(start).await?;
    tracing::debug!(words = words.len(), "walk finished");
    Ok(words.join(" "))
  }

  /// Pick the starting prefix: the first match for the first word of the
  /// first seed, or a random prefix when there are no seeds.
  async fn seek<T: AsRef<str>>(&mut self, seeds: &[T]) -> Result<Prefix> {
    let Some(first) = seeds.first() else {
      return self
        .store
        .random_prefix(&mut self.rng)
        .await
        .map_err(Into::<Error>::into);
    };

    let Some(word) = first.as_ref().split_whitespace().next() else {
      return Err(Error::NoMatch(String::new()));
    };

    let matches = self
      .store
      .find_prefixes_containing(word)
      .await
      .map_err(Into::<Error>::into)?;
    matches
      .into_iter()
      .next()
      .ok_or_else(|| Error::NoMatch(word.to_owned()))
  }

  async fn walk(&mut self, start: Prefix) -> Result<Vec<String>> {
    let mut words = start.words();
    let mut window = start.tuple;
    let author = start.author;
    let mut current = Some(start.id);

    while let Some(prefix_id) = current {
      if let Some(limit) = self.max_words
        && words.len() >= limit
      {
        tracing::debug!(limit, "walk stopped at the word cap");
        break;
      }

      let suffix = match self
        .store
        .random_suffix(prefix_id, &mut self.rng)
        .await
        .map_err(Into::<Error>::into)
      {
        Ok(suffix) => suffix,
        Err(Error::NoSuffix(_)) => break,
        Err(e) => return Err(e),
      };

      window.shift(suffix.word.as_str(), Direction::Forward);
      words.push(suffix.word);

      current = self
        .store
        .lookup_prefix(&window, &author)
        .await
        .map_err(Into::<Error>::into)?
        .map(|p| p.id);
    }

    Ok(words)
  }
}
