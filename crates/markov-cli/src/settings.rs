//! Runtime configuration, layered from defaults, an optional TOML file and
//! `MARKOV_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Deserialised from `markov.toml` and the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite database file holding the chain.
  pub store_path:          PathBuf,
  /// Words per prefix used when ingesting.
  pub order:               usize,
  /// Attribute all ingested text to this author. Unset means every line
  /// starts with its author.
  pub author:              Option<String>,
  pub ingest_timeout_secs: Option<u64>,
  /// Fixed RNG seed for reproducible generation.
  pub seed:                Option<u64>,
}

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("store_path", "markov.db")?
      .set_default("order", 3)?
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("MARKOV"))
      .build()
      .context("failed to read config file")?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
