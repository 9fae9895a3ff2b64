//! Ingestion pipeline — streams text lines into a [`ChainStore`].
//!
//! One working [`Tuple`] slides over the whole stream; it is not reset between
//! lines. Once `order` words have been seen, every further word is recorded as
//! a suffix of a snapshot of the window that preceded it.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
  Error, Result,
  store::ChainStore,
  tuple::{Direction, Tuple},
};

// ─── Author attribution ──────────────────────────────────────────────────────

/// How each input line is attributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorMode {
  /// Every line belongs to this author.
  Fixed(String),
  /// The first whitespace-delimited token of each line is the author; the rest
  /// of the line is content.
  InLine,
}

impl AuthorMode {
  /// A missing or empty author selects [`AuthorMode::InLine`].
  pub fn from_option(author: Option<String>) -> Self {
    match author {
      Some(a) if !a.is_empty() => Self::Fixed(a),
      _ => Self::InLine,
    }
  }

  /// Split `text` into `(author, content)`.
  ///
  /// `line` is the 1-based line number, used only for error reporting.
  pub fn split<'a>(&'a self, line: usize, text: &'a str) -> Result<(&'a str, &'a str)> {
    match self {
      Self::Fixed(author) => Ok((author.as_str(), text)),
      Self::InLine => text
        .trim_start()
        .split_once(char::is_whitespace)
        .ok_or_else(|| Error::MalformedInput { line, text: text.to_owned() }),
    }
  }
}

// ─── Statistics ──────────────────────────────────────────────────────────────

/// Counters reported by a finished ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
  pub lines:        usize,
  pub words:        usize,
  /// Prefix → suffix transitions written to the store.
  pub observations: usize,
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Builds a chain of fixed `order` from streamed text.
pub struct Ingestor<'s, S> {
  store:    &'s S,
  order:    usize,
  author:   AuthorMode,
  deadline: Option<Duration>,
}

impl<'s, S: ChainStore> Ingestor<'s, S> {
  pub fn new(store: &'s S, order: usize, author: AuthorMode) -> Result<Self> {
    if order == 0 {
      return Err(Error::InvalidOrder(order));
    }
    Ok(Self { store, order, author, deadline: None })
  }

  /// Abort with [`Error::Timeout`] if the run takes longer than `limit`.
  ///
  /// A store call already in flight when the deadline passes still commits or
  /// rolls back as a unit; no further input is read.
  pub fn with_timeout(mut self, limit: Duration) -> Self {
    self.deadline = Some(limit);
    self
  }

  /// Consume `reader` line by line. The first error stops the stream.
  pub async fn ingest<R>(&self, reader: R) -> Result<IngestStats>
  where
    R: AsyncBufRead + Unpin,
  {
    let started = Instant::now();
    let stats = match self.deadline {
      Some(limit) => tokio::time::timeout(limit, self.run(reader))
        .await
        .map_err(|_| Error::Timeout(limit))??,
      None => self.run(reader).await?,
    };

    tracing::info!(
      lines = stats.lines,
      words = stats.words,
      observations = stats.observations,
      elapsed = ?started.elapsed(),
      "ingestion finished"
    );
    Ok(stats)
  }

  async fn run<R>(&self, reader: R) -> Result<IngestStats>
  where
    R: AsyncBufRead + Unpin,
  {
    let mut window = Tuple::new(self.order);
    let mut seen = 0usize;
    let mut stats = IngestStats::default();
    let mut lines = reader.lines();

    while let Some(text) = lines.next_line().await? {
      stats.lines += 1;
      if text.trim().is_empty() {
        continue;
      }

      let line_started = Instant::now();
      let (author, content) = self.author.split(stats.lines, &text)?;

      for word in content.split_whitespace() {
        stats.words += 1;
        if seen < self.order {
          seen += 1;
          window.shift(word, Direction::Forward);
          continue;
        }

        let snapshot = window.clone();
        self.observe(&snapshot, author, word).await?;
        stats.observations += 1;

        window.shift(word, Direction::Forward);
      }

      tracing::debug!(
        line = stats.lines,
        author,
        elapsed = ?line_started.elapsed(),
        "{content:?}"
      );
    }

    Ok(stats)
  }

  async fn observe(&self, prefix: &Tuple, author: &str, word: &str) -> Result<()> {
    let prefix_id = self
      .store
      .upsert_prefix(prefix, author)
      .await
      .map_err(Into::<Error>::into)?;
    self
      .store
      .increment_suffix(prefix_id, word)
      .await
      .map_err(Into::<Error>::into)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fixed_author_keeps_whole_line() {
    let mode = AuthorMode::Fixed("test".into());
    let (author, content) = mode.split(1, "user The quick fox").unwrap();
    assert_eq!(author, "test");
    assert_eq!(content, "user The quick fox");
  }

  #[test]
  fn inline_author_takes_first_token() {
    let mode = AuthorMode::InLine;
    let (author, content) = mode.split(1, "alice hello there world").unwrap();
    assert_eq!(author, "alice");
    assert_eq!(content, "hello there world");
  }

  #[test]
  fn inline_author_without_content_is_malformed() {
    let err = AuthorMode::InLine.split(7, "lonely").unwrap_err();
    assert!(matches!(err, Error::MalformedInput { line: 7, ref text } if text == "lonely"));
  }

  #[test]
  fn empty_author_selects_inline_mode() {
    assert_eq!(AuthorMode::from_option(None), AuthorMode::InLine);
    assert_eq!(AuthorMode::from_option(Some(String::new())), AuthorMode::InLine);
    assert_eq!(
      AuthorMode::from_option(Some("bob".into())),
      AuthorMode::Fixed("bob".into())
    );
  }
}
