//! [`Persistence`] — reads and writes the whole dataset through a
//! [`KeyValueSlot`].

use chrono::Utc;
use serde_json::Value;

use crate::{Error, Result, dataset::Dataset, slot::KeyValueSlot};

/// The fixed key the dataset document is stored under.
pub const STORAGE_KEY: &str = "codex_v3_data";

pub struct Persistence<S> {
  slot: S,
  key:  String,
}

impl<S: KeyValueSlot> Persistence<S> {
  pub fn new(slot: S) -> Self { Self::with_key(slot, STORAGE_KEY) }

  pub fn with_key(slot: S, key: impl Into<String>) -> Self {
    Self { slot, key: key.into() }
  }

  pub fn slot(&self) -> &S { &self.slot }

  pub fn key(&self) -> &str { &self.key }

  /// Load the stored dataset.
  ///
  /// An empty slot yields [`Dataset::fresh`]. A stored value that is not a
  /// JSON object is treated as corrupt and also yields a fresh dataset; a
  /// partial document has its missing fields filled in. Only failures of the
  /// slot itself are returned as errors.
  pub fn load(&self) -> Result<Dataset> {
    let Some(raw) = self.slot.read(&self.key).map_err(Error::persistence)? else {
      tracing::debug!(key = %self.key, "slot empty; starting a fresh dataset");
      return Ok(Dataset::fresh());
    };

    match serde_json::from_str::<Value>(&raw) {
      Ok(Value::Object(doc)) => Ok(Dataset::from_object(doc)),
      Ok(other) => {
        tracing::warn!(
          key = %self.key,
          found = json_kind(&other),
          "stored document is not an object; starting a fresh dataset"
        );
        Ok(Dataset::fresh())
      }
      Err(e) => {
        tracing::warn!(
          key = %self.key,
          error = %e,
          "stored document does not parse; starting a fresh dataset"
        );
        Ok(Dataset::fresh())
      }
    }
  }

  /// Stamp `meta.updated_at` and overwrite the slot with the full document.
  pub fn save(&mut self, data: &mut Dataset) -> Result<()> {
    data.meta.updated_at = Utc::now();
    let doc = serde_json::to_string(data)?;
    self.slot.write(&self.key, &doc).map_err(Error::persistence)?;
    tracing::trace!(key = %self.key, bytes = doc.len(), "dataset saved");
    Ok(())
  }
}

pub(crate) fn json_kind(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
