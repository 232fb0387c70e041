//! SQLite backend for the Codex persistence slot.
//!
//! Stores each slot as one row keyed by name, so the ledger's single document
//! survives restarts in a plain SQLite file.

mod schema;
mod slot;

pub mod error;

pub use error::{Error, Result};
pub use slot::SqliteSlot;
