//! Character records — one fictional entity in the user's world.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use strum::{AsRefStr, EnumIter, EnumString};

/// Name given to a freshly created character.
pub const DEFAULT_NAME: &str = "New character";

// ─── Status ──────────────────────────────────────────────────────────────────

/// Whether a character is still around, as far as the author knows.
///
/// Labels are matched case-insensitively. The Portuguese labels written by
/// earlier 3.x documents are accepted on input; anything else reads as
/// [`CharacterStatus::Unknown`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AsRefStr, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum CharacterStatus {
  #[default]
  #[strum(to_string = "alive", serialize = "vivo")]
  Alive,
  #[strum(to_string = "dead", serialize = "morto")]
  Dead,
  #[strum(to_string = "missing", serialize = "desaparecido")]
  Missing,
  #[strum(to_string = "unknown", serialize = "desconhecido")]
  Unknown,
}

impl CharacterStatus {
  pub fn from_label(label: &str) -> Self {
    label.trim().parse().unwrap_or(Self::Unknown)
  }
}

impl std::fmt::Display for CharacterStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_ref())
  }
}

impl Serialize for CharacterStatus {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_ref())
  }
}

impl<'de> Deserialize<'de> for CharacterStatus {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
      Value::String(label) => Self::from_label(&label),
      Value::Null => Self::default(),
      _ => Self::Unknown,
    })
  }
}

// ─── Lenient field readers ───────────────────────────────────────────────────

/// Field readers for hand-edited or foreign documents. A scalar in the wrong
/// JSON type is coerced rather than failing the whole record; structured
/// values still fail, so the record is kept verbatim instead.
mod lenient {
  use serde::{Deserialize, Deserializer, de::Error as _};
  use serde_json::Value;

  use crate::tags::parse_tags;

  pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
      Value::String(s) => Ok(s),
      Value::Number(n) => Ok(n.to_string()),
      Value::Bool(b) => Ok(b.to_string()),
      Value::Null => Ok(String::new()),
      Value::Array(_) | Value::Object(_) => Err(D::Error::custom("expected a text field")),
    }
  }

  /// An array keeps its scalar entries; a string is split like the tag
  /// editor input; anything else reads as no tags.
  pub fn tags<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
      Value::Array(items) => items
        .into_iter()
        .filter_map(|item| match item {
          Value::String(s) => Some(s),
          Value::Number(n) => Some(n.to_string()),
          _ => None,
        })
        .collect(),
      Value::String(raw) => parse_tags(&raw),
      _ => Vec::new(),
    })
  }

  pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    match Value::deserialize(d)? {
      Value::Bool(b) => Ok(b),
      Value::Null => Ok(false),
      other => Err(D::Error::custom(format!("expected a boolean, found {other}"))),
    }
  }
}

// ─── Character ───────────────────────────────────────────────────────────────

/// A character sheet. Every field is optional on input and scalar fields
/// tolerate the wrong JSON type; keys this type does not know are kept in
/// `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Character {
  #[serde(deserialize_with = "lenient::text")]
  pub id:          String,
  #[serde(deserialize_with = "lenient::text")]
  pub name:        String,
  /// Nickname or title.
  #[serde(deserialize_with = "lenient::text")]
  pub alias:       String,
  #[serde(deserialize_with = "lenient::text")]
  pub race:        String,
  /// Free text; fictional ages rarely fit an integer.
  #[serde(deserialize_with = "lenient::text")]
  pub age:         String,
  pub status:      CharacterStatus,
  #[serde(deserialize_with = "lenient::text")]
  pub continent:   String,
  #[serde(deserialize_with = "lenient::text")]
  pub clan:        String,
  #[serde(deserialize_with = "lenient::tags")]
  pub tags:        Vec<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub appearance:  String,
  #[serde(deserialize_with = "lenient::text")]
  pub personality: String,
  #[serde(deserialize_with = "lenient::text")]
  pub lore:        String,
  #[serde(deserialize_with = "lenient::text")]
  pub powers:      String,
  #[serde(deserialize_with = "lenient::text")]
  pub weaknesses:  String,
  #[serde(deserialize_with = "lenient::text")]
  pub notes:       String,
  #[serde(deserialize_with = "lenient::flag")]
  pub favorite:    bool,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
  #[serde(flatten)]
  pub extra:       Map<String, Value>,
}

impl Character {
  /// A blank sheet with a fresh id, stamped at `now`.
  pub fn new(now: DateTime<Utc>) -> Self {
    Self {
      id: crate::new_id(),
      name: DEFAULT_NAME.to_owned(),
      created_at: now,
      updated_at: now,
      ..Self::default()
    }
  }

  /// Every text-bearing field joined by spaces and lower-cased; the haystack
  /// for free-text search.
  pub fn search_blob(&self) -> String {
    let tags = self.tags.join(" ");
    let fields: [&str; 14] = [
      &self.name,
      &self.alias,
      &self.race,
      &self.age,
      self.status.as_ref(),
      &self.continent,
      &self.clan,
      &tags,
      &self.appearance,
      &self.personality,
      &self.lore,
      &self.powers,
      &self.weaknesses,
      &self.notes,
    ];
    fields.join(" ").to_lowercase()
  }

  pub fn has_tag_ignore_case(&self, needle_lower: &str) -> bool {
    self.tags.iter().any(|t| t.to_lowercase() == needle_lower)
  }
}

// ─── Patch ───────────────────────────────────────────────────────────────────

/// Partial update for [`crate::store::Ledger::update_character`]. Only the
/// `Some` fields are written; `id` and `created_at` cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterPatch {
  pub name:        Option<String>,
  pub alias:       Option<String>,
  pub race:        Option<String>,
  pub age:         Option<String>,
  pub status:      Option<CharacterStatus>,
  pub continent:   Option<String>,
  pub clan:        Option<String>,
  pub tags:        Option<Vec<String>>,
  pub appearance:  Option<String>,
  pub personality: Option<String>,
  pub lore:        Option<String>,
  pub powers:      Option<String>,
  pub weaknesses:  Option<String>,
  pub notes:       Option<String>,
  pub favorite:    Option<bool>,
}

impl CharacterPatch {
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  pub fn apply(self, c: &mut Character) {
    fn set<T>(slot: &mut T, value: Option<T>) {
      if let Some(v) = value {
        *slot = v;
      }
    }

    set(&mut c.name, self.name);
    set(&mut c.alias, self.alias);
    set(&mut c.race, self.race);
    set(&mut c.age, self.age);
    set(&mut c.status, self.status);
    set(&mut c.continent, self.continent);
    set(&mut c.clan, self.clan);
    set(&mut c.tags, self.tags);
    set(&mut c.appearance, self.appearance);
    set(&mut c.personality, self.personality);
    set(&mut c.lore, self.lore);
    set(&mut c.powers, self.powers);
    set(&mut c.weaknesses, self.weaknesses);
    set(&mut c.notes, self.notes);
    set(&mut c.favorite, self.favorite);
  }
}
