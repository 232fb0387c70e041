//! Backup export and import validation.
//!
//! A backup is the same document the persistence slot holds, pretty-printed.
//! Import checks only the outer shape: the document must be a JSON object
//! whose `characters` is an array. Individual records are not validated.

use chrono::NaiveDate;
use serde_json::Value;

use crate::{BackupRejection, Result, dataset::Dataset, persist::json_kind};

/// Version tag embedded in backup file names.
pub const BACKUP_TAG: &str = "v3";

/// Pretty-printed document for `data`.
pub fn export(data: &Dataset) -> Result<String> {
  Ok(serde_json::to_string_pretty(data)?)
}

/// `codex-backup-v3-YYYY-MM-DD.json`
pub fn backup_filename(date: NaiveDate) -> String {
  format!("codex-backup-{BACKUP_TAG}-{}.json", date.format("%Y-%m-%d"))
}

/// Check `raw` and, if acceptable, build the dataset it describes.
///
/// Missing `relations` become empty, a missing `meta` is synthesized, and
/// missing catalogs take their defaults.
pub fn validate_backup(raw: &str) -> Result<Dataset, BackupRejection> {
  let parsed: Value =
    serde_json::from_str(raw).map_err(|e| BackupRejection::Malformed(e.to_string()))?;

  let doc = match parsed {
    Value::Object(doc) => doc,
    other => {
      tracing::debug!(found = json_kind(&other), "backup rejected");
      return Err(BackupRejection::NotAnObject);
    }
  };
  if !doc.get("characters").is_some_and(Value::is_array) {
    return Err(BackupRejection::MissingCharacters);
  }

  Ok(Dataset::from_object(doc))
}
