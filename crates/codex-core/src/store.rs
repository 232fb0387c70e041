//! [`Ledger`] — the canonical in-memory dataset with write-through
//! persistence.
//!
//! Every mutation is applied to a copy of the dataset, saved, and only then
//! swapped in. If the save fails the in-memory dataset is unchanged, so no
//! caller can observe a half-applied or unsaved write.

use chrono::Utc;

use crate::{
  Result,
  character::{Character, CharacterPatch},
  dataset::{Dataset, Record},
  persist::Persistence,
  relation::{Relation, normalize_kind},
  slot::KeyValueSlot,
};

pub struct Ledger<S> {
  data:        Dataset,
  persistence: Persistence<S>,
}

impl<S: KeyValueSlot> Ledger<S> {
  /// Load the dataset stored in `slot` under the default key.
  pub fn open(slot: S) -> Result<Self> {
    Self::with_persistence(Persistence::new(slot))
  }

  pub fn with_persistence(persistence: Persistence<S>) -> Result<Self> {
    let data = persistence.load()?;
    Ok(Self { data, persistence })
  }

  pub fn dataset(&self) -> &Dataset { &self.data }

  pub fn persistence(&self) -> &Persistence<S> { &self.persistence }

  fn commit(&mut self, mut next: Dataset) -> Result<()> {
    self.persistence.save(&mut next)?;
    self.data = next;
    Ok(())
  }

  // ── Characters ───────────────────────────────────────────────────────────

  /// Create a blank character at the front of the collection.
  pub fn create_character(&mut self) -> Result<Character> {
    let character = Character::new(Utc::now());
    let mut next = self.data.clone();
    next.characters.insert(0, Record::Typed(character.clone()));
    self.commit(next)?;

    tracing::debug!(id = %character.id, "character created");
    Ok(character)
  }

  /// Merge `patch` into the character `id` and refresh its `updated_at`.
  ///
  /// Returns `Ok(None)` without touching storage when no such character
  /// exists.
  pub fn update_character(
    &mut self,
    id: &str,
    patch: CharacterPatch,
  ) -> Result<Option<Character>> {
    let mut next = self.data.clone();
    let Some(character) = next.character_mut(id) else {
      tracing::debug!(%id, "update ignored; no such character");
      return Ok(None);
    };

    patch.apply(character);
    character.updated_at = Utc::now().max(character.created_at);
    let updated = character.clone();

    self.commit(next)?;
    Ok(Some(updated))
  }

  /// Remove the character `id` together with every relation that starts or
  /// ends at it. Persists even when nothing matched; returns whether a
  /// character was removed.
  pub fn delete_character(&mut self, id: &str) -> Result<bool> {
    let mut next = self.data.clone();
    let removed = next.remove_character_cascade(id);
    self.commit(next)?;

    tracing::debug!(%id, removed, "character deleted");
    Ok(removed)
  }

  // ── Relations ────────────────────────────────────────────────────────────

  /// Add the relation `from_id → to_id` of type `kind` (blank → `ally`).
  ///
  /// Returns `Ok(None)` without touching storage when either endpoint is
  /// blank or not a stored character, when the endpoints are equal, or when
  /// the same `(from, to, type)` edge already exists.
  pub fn add_relation(
    &mut self,
    from_id: &str,
    to_id: &str,
    kind: &str,
    note: &str,
  ) -> Result<Option<Relation>> {
    let kind = normalize_kind(kind);

    if from_id.is_empty() || to_id.is_empty() || from_id == to_id {
      tracing::debug!(%from_id, %to_id, "relation rejected; bad endpoints");
      return Ok(None);
    }
    if !self.data.contains_character(from_id) || !self.data.contains_character(to_id) {
      tracing::debug!(%from_id, %to_id, "relation rejected; unknown endpoint");
      return Ok(None);
    }
    if self.data.relations().any(|r| r.same_edge(from_id, to_id, &kind)) {
      tracing::debug!(%from_id, %to_id, %kind, "relation rejected; duplicate");
      return Ok(None);
    }

    let relation = Relation::new(from_id, to_id, &kind, note, Utc::now());
    let mut next = self.data.clone();
    next.relations.insert(0, Record::Typed(relation.clone()));
    self.commit(next)?;

    tracing::debug!(id = %relation.id, %from_id, %to_id, %kind, "relation added");
    Ok(Some(relation))
  }

  /// Remove the relation `id`. Persists even when nothing matched; returns
  /// whether a relation was removed.
  pub fn remove_relation(&mut self, id: &str) -> Result<bool> {
    let mut next = self.data.clone();
    let removed = next.remove_relation(id);
    self.commit(next)?;
    Ok(removed)
  }

  // ── Catalogs and whole-dataset operations ────────────────────────────────

  pub fn set_catalogs(&mut self, continents: Vec<String>, clans: Vec<String>) -> Result<()> {
    let mut next = self.data.clone();
    next.continents = continents;
    next.clans = clans;
    self.commit(next)
  }

  /// Swap in an entirely new dataset.
  pub fn replace(&mut self, data: Dataset) -> Result<()> { self.commit(data) }
}
