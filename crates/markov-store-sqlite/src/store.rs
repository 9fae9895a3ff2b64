//! [`SqliteStore`] — the SQLite implementation of [`ChainStore`].

use std::{path::Path, time::Duration};

use rand::Rng;
use rusqlite::OptionalExtension as _;

use markov_core::{
  chain::{ChainStats, Prefix, PrefixId, Suffix},
  store::ChainStore,
  tuple::Tuple,
};

use crate::{
  encode::{RawPrefix, RawSuffix, encode_order, scale_roll},
  schema::SCHEMA,
  Error, Result,
};

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Markov chain store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and every
/// clone funnels its calls through the same connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Verify that the search index matches the `prefixes` table.
  pub async fn check_index(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute(
          "INSERT INTO prefixes_idx (prefixes_idx, rank) VALUES ('integrity-check', 1)",
          [],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Rebuild the search index from the `prefixes` table.
  pub async fn rebuild_index(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute("INSERT INTO prefixes_idx (prefixes_idx) VALUES ('rebuild')", [])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ChainStore impl ─────────────────────────────────────────────────────────

impl ChainStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert_prefix(&self, tuple: &Tuple, author: &str) -> Result<PrefixId> {
    let tuple_str = tuple.encode();
    let ord       = encode_order(tuple.order())?;
    let author    = author.to_owned();

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // The index row is written by `prefixes_ai` inside this transaction.
        let inserted = tx.execute(
          "INSERT INTO prefixes (tuple, ord, author) VALUES (?1, ?2, ?3)",
          rusqlite::params![tuple_str, ord, author],
        );

        let id = match inserted {
          Ok(_) => tx.last_insert_rowid(),
          Err(e) if is_unique_violation(&e) => tx.query_row(
            "SELECT id FROM prefixes WHERE tuple = ?1 AND author = ?2",
            rusqlite::params![tuple_str, author],
            |r| r.get(0),
          )?,
          Err(e) => return Err(e.into()),
        };

        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(id)
  }

  async fn increment_suffix(&self, prefix_id: PrefixId, word: &str) -> Result<Suffix> {
    let word = word.to_owned();

    let raw: RawSuffix = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx.query_row(
          "INSERT INTO suffixes (prefix_id, word, count) VALUES (?1, ?2, 1)
           ON CONFLICT (prefix_id, word) DO UPDATE SET count = count + 1
           RETURNING id, prefix_id, word, count",
          rusqlite::params![prefix_id, word],
          RawSuffix::from_row,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_suffix()
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn find_prefixes_containing(&self, word: &str) -> Result<Vec<Prefix>> {
    let token = word.trim();
    if token.is_empty() {
      return Err(markov_core::Error::NoMatch(word.to_owned()).into());
    }
    // Column filter plus a quoted string so the word is never parsed as
    // FTS5 query syntax.
    let query = format!("tuple : \"{}\"", token.replace('"', "\"\""));

    let raws: Vec<RawPrefix> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.id, p.tuple, p.ord, p.author
           FROM prefixes_idx
           JOIN prefixes p ON p.id = prefixes_idx.rowid
           WHERE prefixes_idx MATCH ?1
           ORDER BY p.id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![query], RawPrefix::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    if raws.is_empty() {
      return Err(markov_core::Error::NoMatch(word.to_owned()).into());
    }

    raws.into_iter().map(RawPrefix::into_prefix).collect()
  }

  async fn lookup_prefix(&self, tuple: &Tuple, author: &str) -> Result<Option<Prefix>> {
    let tuple_str = tuple.encode();
    let author    = author.to_owned();

    let raw: Option<RawPrefix> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, tuple, ord, author FROM prefixes
             WHERE tuple = ?1
             ORDER BY (author = ?2) DESC, id
             LIMIT 1",
            rusqlite::params![tuple_str, author],
            RawPrefix::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPrefix::into_prefix).transpose()
  }

  async fn random_prefix<R: Rng + Send>(&self, rng: &mut R) -> Result<Prefix> {
    let roll: f64 = rng.r#gen();

    // Counting and offsetting inside one transaction keeps the choice uniform
    // over existing rows regardless of gaps in the id sequence.
    let raw: Option<RawPrefix> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let total: i64 = tx.query_row("SELECT COUNT(*) FROM prefixes", [], |r| r.get(0))?;
        if total == 0 {
          return Ok(None);
        }

        let raw = tx
          .query_row(
            "SELECT id, tuple, ord, author FROM prefixes ORDER BY id LIMIT 1 OFFSET ?1",
            rusqlite::params![scale_roll(roll, total)],
            RawPrefix::from_row,
          )
          .optional()?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    match raw {
      Some(raw) => raw.into_prefix(),
      None => Err(markov_core::Error::EmptyChain.into()),
    }
  }

  async fn random_suffix<R: Rng + Send>(
    &self,
    prefix_id: PrefixId,
    rng: &mut R,
  ) -> Result<Suffix> {
    let roll: f64 = rng.r#gen();

    // Each suffix owns the slice of [0, total) between the running count
    // before it and its own running count; the first suffix whose running
    // count exceeds the target wins.
    let raw: Option<RawSuffix> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let total: i64 = tx.query_row(
          "SELECT COALESCE(SUM(count), 0) FROM suffixes WHERE prefix_id = ?1",
          rusqlite::params![prefix_id],
          |r| r.get(0),
        )?;
        if total == 0 {
          return Ok(None);
        }

        let raw = tx
          .query_row(
            "SELECT id, prefix_id, word, count FROM (
               SELECT id, prefix_id, word, count,
                      SUM(count) OVER (ORDER BY id) AS running
               FROM suffixes
               WHERE prefix_id = ?1
             )
             WHERE running > ?2
             ORDER BY id
             LIMIT 1",
            rusqlite::params![prefix_id, scale_roll(roll, total)],
            RawSuffix::from_row,
          )
          .optional()?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    match raw {
      Some(raw) => raw.into_suffix(),
      None => Err(markov_core::Error::NoSuffix(prefix_id).into()),
    }
  }

  async fn suffixes_of(&self, prefix_id: PrefixId) -> Result<Vec<Suffix>> {
    let raws: Vec<RawSuffix> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, prefix_id, word, count FROM suffixes
           WHERE prefix_id = ?1
           ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![prefix_id], RawSuffix::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSuffix::into_suffix).collect()
  }

  async fn stats(&self) -> Result<ChainStats> {
    let (prefixes, suffixes, observations): (i64, i64, i64) = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT
             (SELECT COUNT(*) FROM prefixes),
             (SELECT COUNT(*) FROM suffixes),
             (SELECT COALESCE(SUM(count), 0) FROM suffixes)",
          [],
          |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )?)
      })
      .await?;

    let non_negative = |n: i64| {
      u64::try_from(n).map_err(|_| Error::Corrupt(format!("negative aggregate {n}")))
    };

    Ok(ChainStats {
      prefixes:     non_negative(prefixes)?,
      suffixes:     non_negative(suffixes)?,
      observations: non_negative(observations)?,
    })
  }
}
