//! [`SqliteSlot`] — the SQLite implementation of [`KeyValueSlot`].

use std::path::Path;

use chrono::Utc;
use codex_core::slot::KeyValueSlot;
use rusqlite::{Connection, OptionalExtension as _};

use crate::{Error, Result, schema::SCHEMA};

/// A key-value slot store backed by a single SQLite file.
pub struct SqliteSlot {
  conn: Connection,
}

impl SqliteSlot {
  /// Open (or create) a store at `path`, creating parent directories as
  /// needed, and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
      std::fs::create_dir_all(dir)
        .map_err(|source| Error::CreateDir { path: dir.to_path_buf(), source })?;
    }

    let conn = Connection::open(path)?;
    tracing::debug!(path = %path.display(), "opened sqlite slot store");
    Self::init(conn)
  }

  /// Open an in-memory store, for tests.
  pub fn open_in_memory() -> Result<Self> { Self::init(Connection::open_in_memory()?) }

  fn init(conn: Connection) -> Result<Self> {
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn })
  }

  /// When `key` was last written, as stored (RFC 3339).
  pub fn written_at(&self, key: &str) -> Result<Option<String>> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT written_at FROM slots WHERE key = ?1",
          rusqlite::params![key],
          |row| row.get(0),
        )
        .optional()?,
    )
  }
}

impl KeyValueSlot for SqliteSlot {
  type Error = Error;

  fn read(&self, key: &str) -> Result<Option<String>> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT value FROM slots WHERE key = ?1",
          rusqlite::params![key],
          |row| row.get(0),
        )
        .optional()?,
    )
  }

  fn write(&mut self, key: &str, value: &str) -> Result<()> {
    let at = Utc::now().to_rfc3339();
    self.conn.execute(
      "INSERT INTO slots (key, value, written_at) VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                      written_at = excluded.written_at",
      rusqlite::params![key, value, at],
    )?;
    Ok(())
  }
}
