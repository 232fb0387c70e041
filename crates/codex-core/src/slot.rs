//! The `KeyValueSlot` trait — the durable storage seam.
//!
//! The ledger persists its entire dataset as one serialized document under a
//! single fixed key. Backends only need to store and return opaque strings;
//! they never see the document's structure.

use std::{collections::HashMap, convert::Infallible};

/// Synchronous, process-local, durable string storage addressed by key.
///
/// `write` must replace the previous value completely before returning.
pub trait KeyValueSlot {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return the value stored under `key`, or `None` if the slot is empty.
  fn read(&self, key: &str) -> Result<Option<String>, Self::Error>;

  /// Overwrite the value stored under `key`.
  fn write(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// A slot that lives only as long as the process. Used by tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
  entries: HashMap<String, String>,
}

impl MemorySlot {
  pub fn new() -> Self { Self::default() }

  /// A slot pre-filled with `value` under `key`.
  pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
    let mut slot = Self::new();
    slot.entries.insert(key.to_owned(), value.into());
    slot
  }
}

impl KeyValueSlot for MemorySlot {
  type Error = Infallible;

  fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
    Ok(self.entries.get(key).cloned())
  }

  fn write(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
    self.entries.insert(key.to_owned(), value.to_owned());
    Ok(())
  }
}

impl<S: KeyValueSlot + ?Sized> KeyValueSlot for &mut S {
  type Error = S::Error;

  fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
    (**self).read(key)
  }

  fn write(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
    (**self).write(key, value)
  }
}
