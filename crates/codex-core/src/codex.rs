//! [`Codex`] — the application controller.
//!
//! Owns the [`Ledger`] and the [`Session`], sequences commands across them,
//! and tells subscribers when something changed. This is the only surface an
//! external UI layer needs: read through the query methods, write through the
//! commands, re-read on every change signal.

use chrono::NaiveDate;

use crate::{
  Result, backup,
  character::{Character, CharacterPatch},
  dataset::Dataset,
  persist::Persistence,
  query::{self, RelationView},
  relation::Relation,
  session::{Session, View, parse_catalog_lines},
  slot::KeyValueSlot,
  store::Ledger,
};

type Listener = Box<dyn FnMut()>;

pub struct Codex<S> {
  ledger:    Ledger<S>,
  session:   Session,
  listeners: Vec<Listener>,
}

impl<S: KeyValueSlot> Codex<S> {
  pub fn open(slot: S) -> Result<Self> { Ok(Self::from_ledger(Ledger::open(slot)?)) }

  pub fn with_persistence(persistence: Persistence<S>) -> Result<Self> {
    Ok(Self::from_ledger(Ledger::with_persistence(persistence)?))
  }

  pub fn from_ledger(ledger: Ledger<S>) -> Self {
    Self { ledger, session: Session::default(), listeners: Vec::new() }
  }

  /// Register a callback fired once after every successful mutation.
  pub fn subscribe(&mut self, listener: impl FnMut() + 'static) {
    self.listeners.push(Box::new(listener));
  }

  fn notify(&mut self) {
    for listener in &mut self.listeners {
      listener();
    }
  }

  // ── Reads ────────────────────────────────────────────────────────────────

  pub fn dataset(&self) -> &Dataset { self.ledger.dataset() }

  pub fn ledger(&self) -> &Ledger<S> { &self.ledger }

  pub fn session(&self) -> &Session { &self.session }

  pub fn filtered_characters(&self, search: &str, tag_filter: &str) -> Vec<&Character> {
    query::filtered_characters(self.dataset(), search, tag_filter)
  }

  /// [`Self::filtered_characters`] under the session's search and tag filter.
  pub fn visible_characters(&self) -> Vec<&Character> {
    self.filtered_characters(&self.session.search_text, &self.session.tag_filter)
  }

  pub fn all_tags(&self) -> Vec<String> { query::all_tags(self.dataset()) }

  pub fn relations_for(&self, id: &str) -> Vec<RelationView<'_>> {
    query::relations_for(self.dataset(), id)
  }

  pub fn relations_to(&self, id: &str) -> Vec<RelationView<'_>> {
    query::relations_to(self.dataset(), id)
  }

  pub fn selected(&self) -> Option<&Character> {
    let id = self.session.selected_id.as_deref()?;
    self.dataset().character(id)
  }

  pub fn continents(&self) -> &[String] { &self.dataset().continents }

  pub fn clans(&self) -> &[String] { &self.dataset().clans }

  // ── Character commands ───────────────────────────────────────────────────

  /// Create a character, select it and switch to the character view.
  pub fn create_character(&mut self) -> Result<Character> {
    let character = self.ledger.create_character()?;
    self.session.selected_id = Some(character.id.clone());
    self.session.view = View::Characters;
    self.notify();
    Ok(character)
  }

  /// Returns `false`, with no effect, when `id` does not exist.
  pub fn update_character(&mut self, id: &str, patch: CharacterPatch) -> Result<bool> {
    let found = self.ledger.update_character(id, patch)?.is_some();
    if found {
      self.notify();
    }
    Ok(found)
  }

  /// Delete a character and its relations; clears the selection if it was
  /// the selected one.
  pub fn delete_character(&mut self, id: &str) -> Result<bool> {
    let removed = self.ledger.delete_character(id)?;
    if self.session.selected_id.as_deref() == Some(id) {
      self.session.selected_id = None;
    }
    self.notify();
    Ok(removed)
  }

  pub fn add_relation(
    &mut self,
    from_id: &str,
    to_id: &str,
    kind: &str,
    note: &str,
  ) -> Result<Option<Relation>> {
    let added = self.ledger.add_relation(from_id, to_id, kind, note)?;
    if added.is_some() {
      self.notify();
    }
    Ok(added)
  }

  pub fn remove_relation(&mut self, id: &str) -> Result<bool> {
    let removed = self.ledger.remove_relation(id)?;
    self.notify();
    Ok(removed)
  }

  /// Save the world-catalog editor: one entry per line in each text.
  pub fn set_catalogs(&mut self, continents_text: &str, clans_text: &str) -> Result<()> {
    self.ledger.set_catalogs(
      parse_catalog_lines(continents_text),
      parse_catalog_lines(clans_text),
    )?;
    self.notify();
    Ok(())
  }

  // ── Session commands ─────────────────────────────────────────────────────

  /// Select a character (and show the character view), or clear the
  /// selection with `None`. Selecting an unknown id does nothing.
  pub fn set_selection(&mut self, id: Option<&str>) {
    match id {
      Some(id) if !self.dataset().contains_character(id) => {
        tracing::debug!(%id, "selection ignored; no such character");
        return;
      }
      Some(id) => {
        self.session.selected_id = Some(id.to_owned());
        self.session.view = View::Characters;
      }
      None => self.session.selected_id = None,
    }
    self.notify();
  }

  pub fn set_view(&mut self, view: View) {
    self.session.view = view;
    self.notify();
  }

  pub fn set_search_text(&mut self, text: &str) {
    self.session.search_text = text.to_owned();
    self.notify();
  }

  pub fn set_tag_filter(&mut self, text: &str) {
    self.session.tag_filter = text.to_owned();
    self.notify();
  }

  // ── Backup commands ──────────────────────────────────────────────────────

  pub fn export_backup(&self) -> Result<String> { backup::export(self.dataset()) }

  pub fn backup_filename(&self, date: NaiveDate) -> String { backup::backup_filename(date) }

  /// Replace the whole dataset with the one in `raw`.
  ///
  /// On [`crate::Error::InvalidBackup`] (or a failed save) nothing changes: neither
  /// the dataset nor the session.
  pub fn import_backup(&mut self, raw: &str) -> Result<()> {
    let incoming = backup::validate_backup(raw).inspect_err(|reason| {
      tracing::warn!(%reason, "backup import refused");
    })?;
    let counts = (incoming.characters.len(), incoming.relations.len());

    self.ledger.replace(incoming)?;
    self.session.clear_selection_and_filters();
    self.notify();

    tracing::info!(characters = counts.0, relations = counts.1, "backup imported");
    Ok(())
  }

  /// Replace everything with a fresh default dataset.
  pub fn reset_all(&mut self) -> Result<()> {
    self.ledger.replace(Dataset::fresh())?;
    self.session.clear_selection_and_filters();
    self.notify();

    tracing::info!("dataset reset");
    Ok(())
  }
}

impl<S> std::fmt::Debug for Codex<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Codex")
      .field("session", &self.session)
      .field("listeners", &self.listeners.len())
      .finish_non_exhaustive()
  }
}
