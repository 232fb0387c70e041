//! Relations — directed, typed edges between two characters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type used when a relation is added without one.
pub const DEFAULT_KIND: &str = "ally";

/// Relation types offered to the user. The `type` field is free text; these
/// are suggestions only.
pub const SUGGESTED_KINDS: [&str; 9] = [
  "ally",
  "enemy",
  "family",
  "romance",
  "mentor",
  "disciple",
  "rival",
  "subordinate",
  "superior",
];

/// An edge `from_id → to_id`. `(from_id, to_id, kind)` is unique within a
/// dataset and `from_id != to_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Relation {
  pub id:         String,
  pub from_id:    String,
  pub to_id:      String,
  #[serde(rename = "type")]
  pub kind:       String,
  pub note:       String,
  pub created_at: DateTime<Utc>,
  #[serde(flatten)]
  pub extra:      Map<String, Value>,
}

impl Relation {
  pub fn new(
    from_id: &str,
    to_id: &str,
    kind: &str,
    note: &str,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      id: crate::new_id(),
      from_id: from_id.to_owned(),
      to_id: to_id.to_owned(),
      kind: normalize_kind(kind),
      note: note.to_owned(),
      created_at: now,
      extra: Map::new(),
    }
  }

  pub fn touches(&self, character_id: &str) -> bool {
    self.from_id == character_id || self.to_id == character_id
  }

  pub fn same_edge(&self, from_id: &str, to_id: &str, kind: &str) -> bool {
    self.from_id == from_id && self.to_id == to_id && self.kind == kind
  }
}

/// Blank types fall back to [`DEFAULT_KIND`]; anything else is kept as given.
pub fn normalize_kind(kind: &str) -> String {
  if kind.trim().is_empty() {
    DEFAULT_KIND.to_owned()
  } else {
    kind.to_owned()
  }
}
