//! `codex` — command-line front end for the Codex worldbuilding ledger.
//!
//! # Usage
//!
//! ```text
//! codex new --name Seren
//! codex list --search varyn --tag arcanyth
//! codex relate <from-id> <to-id> --kind rival
//! codex export --out backup.json
//! codex --store ~/worlds/codex.db import backup.json
//! ```

mod commands;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use codex_core::{Codex, character::CharacterStatus, persist::{Persistence, STORAGE_KEY}};
use codex_store_sqlite::SqliteSlot;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "codex", version, about = "Keep track of your characters and how they relate")]
struct Cli {
  /// Path to a TOML config file (store_path, storage_key).
  #[arg(short, long, value_name = "FILE", default_value = "codex.toml")]
  config: PathBuf,

  /// SQLite file holding the ledger; overrides the config file.
  #[arg(long, env = "CODEX_STORE", value_name = "FILE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List characters, favorites first.
  List {
    /// Case-insensitive substring over every text field.
    #[arg(short, long, default_value = "")]
    search: String,
    /// Show only characters carrying this tag (case-insensitive).
    #[arg(short, long, default_value = "")]
    tag: String,
  },
  /// List every tag in use.
  Tags,
  /// Create a character and print its id.
  New {
    #[arg(long)]
    name: Option<String>,
  },
  /// Print a character sheet with its relations.
  Show { id: String },
  /// Change fields of a character; unspecified fields are left alone.
  Edit(EditArgs),
  /// Delete a character and every relation touching it.
  Delete { id: String },
  /// Add a directed relation FROM → TO.
  Relate {
    from: String,
    to:   String,
    /// Relation type, e.g. ally, enemy, mentor (default: ally).
    #[arg(short, long, default_value = "")]
    kind: String,
    #[arg(short, long, default_value = "")]
    note: String,
  },
  /// Remove a relation by its id.
  Unrelate { id: String },
  /// Show the world catalogs, or replace them from files (one entry per line).
  Catalogs {
    #[arg(long, value_name = "FILE")]
    continents: Option<PathBuf>,
    #[arg(long, value_name = "FILE")]
    clans:      Option<PathBuf>,
  },
  /// Write a backup document (default: codex-backup-v3-<date>.json; `-` for
  /// stdout).
  Export {
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,
  },
  /// Replace everything with the contents of a backup document.
  Import { path: PathBuf },
  /// Erase everything and start from the default dataset.
  Reset {
    /// Confirm the reset.
    #[arg(long)]
    yes: bool,
  },
}

#[derive(Args, Debug)]
struct EditArgs {
  id: String,
  #[arg(long)]
  name:        Option<String>,
  #[arg(long)]
  alias:       Option<String>,
  #[arg(long)]
  race:        Option<String>,
  #[arg(long)]
  age:         Option<String>,
  /// alive, dead, missing or unknown.
  #[arg(long)]
  status:      Option<CharacterStatus>,
  #[arg(long)]
  continent:   Option<String>,
  #[arg(long)]
  clan:        Option<String>,
  /// Tags separated by commas or double spaces; a leading `#` is dropped.
  #[arg(long, value_name = "TAGS")]
  tags:        Option<String>,
  #[arg(long)]
  appearance:  Option<String>,
  #[arg(long)]
  personality: Option<String>,
  #[arg(long)]
  lore:        Option<String>,
  #[arg(long)]
  powers:      Option<String>,
  #[arg(long)]
  weaknesses:  Option<String>,
  #[arg(long)]
  notes:       Option<String>,
  #[arg(long)]
  favorite:    Option<bool>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Settings read from the config file and `CODEX_*` environment variables.
#[derive(Deserialize, Debug, Clone)]
struct CliConfig {
  store_path:  PathBuf,
  storage_key: String,
}

fn load_config(path: &Path) -> Result<CliConfig> {
  let settings = config::Config::builder()
    .set_default("store_path", "~/.local/share/codex/codex.db")?
    .set_default("storage_key", STORAGE_KEY)?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("CODEX"))
    .build()
    .with_context(|| format!("reading config file {}", path.display()))?;

  settings
    .try_deserialize()
    .context("failed to deserialise CliConfig")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = load_config(&cli.config)?;

  // --store overrides the config file, which overrides the default.
  let store_path = expand_tilde(cli.store.as_deref().unwrap_or(&cfg.store_path));

  let slot = SqliteSlot::open(&store_path)
    .with_context(|| format!("failed to open store at {}", store_path.display()))?;
  let mut codex = Codex::with_persistence(Persistence::with_key(slot, cfg.storage_key))
    .context("loading ledger")?;
  codex.subscribe(|| tracing::trace!("ledger changed"));

  commands::run(&mut codex, cli.command)
}

/// Resolve a leading `~` component against `$HOME`. Paths that do not start
/// with `~`, and `~user` forms, are returned as given.
fn expand_tilde(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
