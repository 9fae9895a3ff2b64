//! `markov` — build and query a persistent Markov chain.
//!
//! # Usage
//!
//! ```text
//! markov ingest corpus.txt --order 3 --author alice
//! markov ingest irc.log                # each line starts with its author
//! markov generate The quick
//! markov search fox --json
//! ```

mod settings;

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use markov_core::{
  generate::Generator,
  ingest::{AuthorMode, Ingestor},
  store::ChainStore,
};
use markov_store_sqlite::SqliteStore;
use tokio::io::{AsyncBufRead, AsyncWriteExt, BufReader};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use settings::Settings;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Persistent n-gram Markov chain")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "markov.toml")]
  config: PathBuf,

  /// SQLite database file; overrides `store_path` from the config.
  #[arg(short, long)]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Add text to the chain, one line at a time.
  Ingest {
    /// Input file; reads stdin when omitted.
    file: Option<PathBuf>,

    /// Words per prefix.
    #[arg(short, long)]
    order: Option<usize>,

    /// Attribute every line to this author instead of reading it from the
    /// first word of each line.
    #[arg(short, long)]
    author: Option<String>,

    /// Give up after this many seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
  },

  /// Walk the chain and print the result.
  Generate {
    /// Start from a prefix containing the first of these words.
    words: Vec<String>,

    /// RNG seed for a reproducible walk.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many words; by default the walk runs until the chain
    /// has no successor.
    #[arg(long)]
    max_words: Option<usize>,
  },

  /// List prefixes containing a word.
  Search {
    word: String,

    /// Print JSON instead of one prefix per line.
    #[arg(long)]
    json: bool,
  },

  /// Print chain size and verify the search index.
  Stats,

  /// Rebuild the search index from the prefix table.
  Reindex,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so generated text on stdout stays clean.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let store_path = cli.store.unwrap_or_else(|| settings.store_path.clone());
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Command::Ingest { file, order, author, timeout } => {
      let order = order.unwrap_or(settings.order);
      let author = AuthorMode::from_option(author.or(settings.author));
      let timeout = timeout.or(settings.ingest_timeout_secs);

      let mut ingestor = Ingestor::new(&store, order, author)?;
      if let Some(secs) = timeout {
        ingestor = ingestor.with_timeout(Duration::from_secs(secs));
      }

      let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &file {
        Some(path) => Box::new(BufReader::new(
          tokio::fs::File::open(path)
            .await
            .with_context(|| format!("failed to open {path:?}"))?,
        )),
        None => Box::new(BufReader::new(tokio::io::stdin())),
      };

      let stats = ingestor.ingest(reader).await.context("ingestion failed")?;
      tracing::info!(
        lines = stats.lines,
        observations = stats.observations,
        "ingested into {store_path:?}"
      );
    }

    Command::Generate { words, seed, max_words } => {
      let mut generator = match seed.or(settings.seed) {
        Some(seed) => Generator::seeded(&store, seed),
        None => Generator::new(&store),
      };
      if let Some(limit) = max_words {
        generator = generator.with_max_words(limit);
      }

      let mut stdout = tokio::io::stdout();
      generator
        .generate(&mut stdout, words.as_slice())
        .await
        .context("generation failed")?;
      stdout.write_all(b"\n").await?;
      stdout.flush().await?;
    }

    Command::Search { word, json } => {
      let prefixes = store
        .find_prefixes_containing(&word)
        .await
        .map_err(markov_core::Error::from)?;

      if json {
        println!("{}", serde_json::to_string_pretty(&prefixes)?);
      } else {
        for p in &prefixes {
          println!("{:>8}  {p}", p.id);
        }
      }
    }

    Command::Stats => {
      let stats = store.stats().await?;
      println!("prefixes:     {}", stats.prefixes);
      println!("suffixes:     {}", stats.suffixes);
      println!("observations: {}", stats.observations);

      store
        .check_index()
        .await
        .context("search index is inconsistent; run `markov reindex`")?;
      println!("search index: ok");
    }

    Command::Reindex => {
      store.rebuild_index().await?;
      store.check_index().await?;
      tracing::info!("search index rebuilt");
    }
  }

  Ok(())
}
