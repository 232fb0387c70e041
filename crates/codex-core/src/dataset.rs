//! The root aggregate and its document form.
//!
//! A [`Dataset`] serializes to the one document shape used both for the local
//! persistence slot and for backup files:
//!
//! ```json
//! { "meta": {...}, "continents": [...], "clans": [...],
//!   "characters": [...], "relations": [...] }
//! ```
//!
//! Reading is forgiving. Missing top-level fields are filled with defaults,
//! and records that do not fit the typed model are carried along verbatim as
//! [`Record::Opaque`].

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{APP_VERSION, character::Character, relation::Relation};

pub const DEFAULT_CONTINENTS: [&str; 7] = [
  "Varyon", "Brelgorn", "Kaelyra", "Zathari", "Solvarya", "Sythra", "Noctharra",
];

pub const DEFAULT_CLANS: [&str; 3] = ["Arcanyth", "Alfanor", "Quinq"];

// ─── Meta ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
  pub version:    String,
  pub created_at: DateTime<Utc>,
  /// Restamped by the persistence adapter on every save.
  pub updated_at: DateTime<Utc>,
  #[serde(flatten)]
  pub extra:      Map<String, Value>,
}

impl Meta {
  pub fn fresh() -> Self {
    let now = Utc::now();
    Self { version: APP_VERSION.to_owned(), created_at: now, updated_at: now, extra: Map::new() }
  }

  /// Read a stored `meta` block. Each missing or ill-typed field is replaced
  /// on its own; unknown keys are kept.
  pub fn from_value(value: Value) -> Self {
    let mut meta = Self::fresh();
    let Value::Object(mut doc) = value else {
      return meta;
    };

    if let Some(Value::String(version)) = doc.remove("version") {
      meta.version = version;
    }
    if let Some(at) = doc.remove("createdAt").and_then(timestamp) {
      meta.created_at = at;
    }
    if let Some(at) = doc.remove("updatedAt").and_then(timestamp) {
      meta.updated_at = at;
    }
    meta.extra = doc;
    meta
  }
}

fn timestamp(value: Value) -> Option<DateTime<Utc>> {
  match value {
    Value::String(s) => s.parse().ok(),
    _ => None,
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// An entry of `characters[]` or `relations[]`.
///
/// Imported documents are not validated record by record; an entry that does
/// not read as `T` is kept as raw JSON so it survives export unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record<T> {
  Typed(T),
  Opaque(Value),
}

impl<T: DeserializeOwned> Record<T> {
  pub fn from_value(value: Value) -> Self {
    match T::deserialize(&value) {
      Ok(typed) => Self::Typed(typed),
      Err(_) => Self::Opaque(value),
    }
  }
}

impl<T> Record<T> {
  pub fn typed(&self) -> Option<&T> {
    match self {
      Self::Typed(t) => Some(t),
      Self::Opaque(_) => None,
    }
  }

  pub fn typed_mut(&mut self) -> Option<&mut T> {
    match self {
      Self::Typed(t) => Some(t),
      Self::Opaque(_) => None,
    }
  }

  /// A string field of an opaque record, e.g. `fromId`.
  fn raw_str(&self, key: &str) -> Option<&str> {
    match self {
      Self::Typed(_) => None,
      Self::Opaque(v) => v.get(key).and_then(Value::as_str),
    }
  }
}

// ─── Dataset ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
  pub meta:       Meta,
  pub continents: Vec<String>,
  pub clans:      Vec<String>,
  pub characters: Vec<Record<Character>>,
  pub relations:  Vec<Record<Relation>>,
  /// Top-level keys this version does not know about.
  #[serde(flatten)]
  pub extra:      Map<String, Value>,
}

impl Default for Dataset {
  fn default() -> Self { Self::fresh() }
}

impl Dataset {
  /// The dataset a first-ever launch starts from.
  pub fn fresh() -> Self {
    Self {
      meta:       Meta::fresh(),
      continents: DEFAULT_CONTINENTS.map(str::to_owned).to_vec(),
      clans:      DEFAULT_CLANS.map(str::to_owned).to_vec(),
      characters: Vec::new(),
      relations:  Vec::new(),
      extra:      Map::new(),
    }
  }

  /// Build a dataset from a parsed document object, filling every missing or
  /// ill-typed top-level field with its default.
  pub fn from_object(mut doc: Map<String, Value>) -> Self {
    let meta = doc.remove("meta").map_or_else(Meta::fresh, Meta::from_value);
    let continents = doc
      .remove("continents")
      .and_then(catalog)
      .unwrap_or_else(|| DEFAULT_CONTINENTS.map(str::to_owned).to_vec());
    let clans = doc
      .remove("clans")
      .and_then(catalog)
      .unwrap_or_else(|| DEFAULT_CLANS.map(str::to_owned).to_vec());
    let characters = records(doc.remove("characters"));
    let relations = records(doc.remove("relations"));

    Self { meta, continents, clans, characters, relations, extra: doc }
  }

  // ── Typed views ──────────────────────────────────────────────────────────

  /// Typed characters in stored order (most recently created first).
  pub fn characters(&self) -> impl Iterator<Item = &Character> {
    self.characters.iter().filter_map(Record::typed)
  }

  pub fn relations(&self) -> impl Iterator<Item = &Relation> {
    self.relations.iter().filter_map(Record::typed)
  }

  pub fn character(&self, id: &str) -> Option<&Character> {
    self.characters().find(|c| c.id == id)
  }

  pub fn character_mut(&mut self, id: &str) -> Option<&mut Character> {
    self
      .characters
      .iter_mut()
      .filter_map(Record::typed_mut)
      .find(|c| c.id == id)
  }

  pub fn contains_character(&self, id: &str) -> bool {
    self.character(id).is_some()
  }

  // ── Removal ──────────────────────────────────────────────────────────────

  /// Drop the character `id` and every relation touching it, typed or opaque.
  /// Opaque character records are matched by their raw `id`. Returns whether
  /// a character was removed.
  pub(crate) fn remove_character_cascade(&mut self, id: &str) -> bool {
    self.relations.retain(|r| match r.typed() {
      Some(rel) => !rel.touches(id),
      None => r.raw_str("fromId") != Some(id) && r.raw_str("toId") != Some(id),
    });

    let before = self.characters.len();
    self.characters.retain(|c| match c.typed() {
      Some(ch) => ch.id != id,
      None => c.raw_str("id") != Some(id),
    });
    self.characters.len() != before
  }

  pub(crate) fn remove_relation(&mut self, id: &str) -> bool {
    let before = self.relations.len();
    self.relations.retain(|r| match r.typed() {
      Some(rel) => rel.id != id,
      None => r.raw_str("id") != Some(id),
    });
    self.relations.len() != before
  }
}

fn catalog(value: Value) -> Option<Vec<String>> {
  match value {
    Value::Array(items) => Some(
      items
        .into_iter()
        .filter_map(|item| match item {
          Value::String(s) => Some(s),
          _ => None,
        })
        .collect(),
    ),
    _ => None,
  }
}

fn records<T: DeserializeOwned>(value: Option<Value>) -> Vec<Record<T>> {
  match value {
    Some(Value::Array(items)) => items.into_iter().map(Record::from_value).collect(),
    _ => Vec::new(),
  }
}
