//! Core types and logic for the Codex worldbuilding ledger.
//!
//! A ledger holds a user's fictional characters, the directed relations
//! between them, and two suggestion catalogs (continents and clans). The
//! whole dataset lives in memory and is written through to a single
//! key-value slot on every mutation.
//!
//! This crate is free of database dependencies. Durable slots are provided by
//! backend crates (e.g. `codex-store-sqlite`) implementing
//! [`slot::KeyValueSlot`].

pub mod backup;
pub mod character;
pub mod codex;
pub mod dataset;
pub mod error;
pub mod persist;
pub mod query;
pub mod relation;
pub mod session;
pub mod slot;
pub mod store;
pub mod tags;

pub use codex::Codex;
pub use error::{BackupRejection, Error, Result};

/// Version tag stamped into `meta.version` of freshly created datasets.
pub const APP_VERSION: &str = "3.0.0";

pub(crate) fn new_id() -> String { uuid::Uuid::new_v4().to_string() }

#[cfg(test)]
mod tests;
