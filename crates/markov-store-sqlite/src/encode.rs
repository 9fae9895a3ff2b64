//! Encoding and decoding helpers between chain records and SQLite columns.
//!
//! Tuples are stored in their canonical space-joined form. Orders and counts
//! are stored as `INTEGER` and checked on the way out.

use markov_core::{
  chain::{Prefix, PrefixId, Suffix, SuffixId},
  tuple::Tuple,
};

use crate::{Error, Result};

// ─── Integers ────────────────────────────────────────────────────────────────

pub fn encode_order(order: usize) -> Result<i64> {
  i64::try_from(order).map_err(|_| Error::Corrupt(format!("order {order} out of range")))
}

pub fn decode_order(ord: i64) -> Result<usize> {
  usize::try_from(ord)
    .ok()
    .filter(|&o| o > 0)
    .ok_or_else(|| Error::Corrupt(format!("invalid order {ord}")))
}

pub fn decode_count(count: i64) -> Result<u64> {
  u64::try_from(count)
    .ok()
    .filter(|&c| c > 0)
    .ok_or_else(|| Error::Corrupt(format!("invalid suffix count {count}")))
}

/// Map a uniform `roll` in `[0, 1)` onto `0..total`.
pub fn scale_roll(roll: f64, total: i64) -> i64 {
  ((roll * total as f64) as i64).clamp(0, total - 1)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns of a `prefixes` row, in `SELECT id, tuple, ord, author` order.
pub struct RawPrefix {
  pub id:     PrefixId,
  pub tuple:  String,
  pub ord:    i64,
  pub author: String,
}

impl RawPrefix {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:     row.get(0)?,
      tuple:  row.get(1)?,
      ord:    row.get(2)?,
      author: row.get(3)?,
    })
  }

  pub fn into_prefix(self) -> Result<Prefix> {
    let tuple = Tuple::decode(&self.tuple);
    let order = decode_order(self.ord)?;
    if tuple.order() != order {
      return Err(Error::Corrupt(format!(
        "prefix {} has {} words but order {order}",
        self.id,
        tuple.order()
      )));
    }

    Ok(Prefix { id: self.id, tuple, order, author: self.author })
  }
}

/// Columns of a `suffixes` row, in `SELECT id, prefix_id, word, count` order.
pub struct RawSuffix {
  pub id:        SuffixId,
  pub prefix_id: PrefixId,
  pub word:      String,
  pub count:     i64,
}

impl RawSuffix {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      prefix_id: row.get(1)?,
      word:      row.get(2)?,
      count:     row.get(3)?,
    })
  }

  pub fn into_suffix(self) -> Result<Suffix> {
    Ok(Suffix {
      id:        self.id,
      prefix_id: self.prefix_id,
      word:      self.word,
      count:     decode_count(self.count)?,
    })
  }
}
