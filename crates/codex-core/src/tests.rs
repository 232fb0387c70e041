//! Behavioural tests for the ledger, queries, persistence and backups, run
//! against an in-memory slot.

use std::{cell::Cell, rc::Rc};

use proptest::prelude::*;
use serde_json::{Value, json};
use strum::IntoEnumIterator as _;

use crate::{
  BackupRejection, Codex, Error,
  backup::{backup_filename, export, validate_backup},
  character::{CharacterPatch, CharacterStatus, DEFAULT_NAME},
  dataset::{DEFAULT_CLANS, DEFAULT_CONTINENTS, Dataset, Record},
  persist::{Persistence, STORAGE_KEY},
  query::MISSING_TARGET_NAME,
  relation::SUGGESTED_KINDS,
  session::View,
  slot::{KeyValueSlot, MemorySlot},
  store::Ledger,
};

fn codex() -> Codex<MemorySlot> { Codex::open(MemorySlot::new()).expect("memory slot") }

fn named(c: &mut Codex<MemorySlot>, name: &str) -> String {
  let id = c.create_character().unwrap().id;
  c.update_character(&id, CharacterPatch { name: Some(name.into()), ..Default::default() })
    .unwrap();
  id
}

fn stored(c: &Codex<MemorySlot>) -> Value {
  let raw = c
    .ledger()
    .persistence()
    .slot()
    .read(STORAGE_KEY)
    .unwrap()
    .expect("slot written");
  serde_json::from_str(&raw).unwrap()
}

/// A slot whose writes start failing once `fail` is set.
#[derive(Default)]
struct FlakySlot {
  inner: MemorySlot,
  fail:  Rc<Cell<bool>>,
}

#[derive(Debug, thiserror::Error)]
#[error("disk full")]
struct DiskFull;

impl KeyValueSlot for FlakySlot {
  type Error = DiskFull;

  fn read(&self, key: &str) -> Result<Option<String>, DiskFull> {
    Ok(self.inner.read(key).unwrap_or_default())
  }

  fn write(&mut self, key: &str, value: &str) -> Result<(), DiskFull> {
    if self.fail.get() {
      return Err(DiskFull);
    }
    let _ = self.inner.write(key, value);
    Ok(())
  }
}

// ─── Characters ──────────────────────────────────────────────────────────────

#[test]
fn create_character_uses_defaults_and_prepends() {
  let mut c = codex();
  let first = c.create_character().unwrap();
  let second = c.create_character().unwrap();

  assert_eq!(first.name, DEFAULT_NAME);
  assert_eq!(first.status, CharacterStatus::Alive);
  assert!(first.tags.is_empty());
  assert!(!first.favorite);
  assert!(first.alias.is_empty() && first.lore.is_empty());
  assert_ne!(first.id, second.id);

  let ids: Vec<_> = c.dataset().characters().map(|ch| ch.id.clone()).collect();
  assert_eq!(ids, [second.id.clone(), first.id]);
  assert_eq!(c.session().selected_id.as_deref(), Some(second.id.as_str()));
}

#[test]
fn mutations_write_through_to_the_slot() {
  let mut c = codex();
  let id = named(&mut c, "Seren");

  let doc = stored(&c);
  assert_eq!(doc["characters"][0]["id"], json!(id));
  assert_eq!(doc["characters"][0]["name"], json!("Seren"));
  assert_eq!(doc["meta"]["version"], json!("3.0.0"));
}

#[test]
fn update_merges_only_supplied_fields() {
  let mut c = codex();
  let id = named(&mut c, "Kael Varyn");
  let before = c.dataset().character(&id).unwrap().clone();

  let changed = c
    .update_character(&id, CharacterPatch {
      race: Some("Elf".into()),
      tags: Some(vec!["Arcanyth".into()]),
      ..Default::default()
    })
    .unwrap();
  assert!(changed);

  let after = c.dataset().character(&id).unwrap();
  assert_eq!(after.name, "Kael Varyn");
  assert_eq!(after.race, "Elf");
  assert_eq!(after.tags, ["Arcanyth"]);
  assert_eq!(after.created_at, before.created_at);
  assert!(after.updated_at >= before.updated_at);
  assert!(after.updated_at >= after.created_at);
}

#[test]
fn update_unknown_id_is_silent_noop() {
  let mut c = codex();
  named(&mut c, "Seren");
  let snapshot = c.dataset().clone();

  let changed = c
    .update_character("nope", CharacterPatch { name: Some("x".into()), ..Default::default() })
    .unwrap();

  assert!(!changed);
  assert_eq!(c.dataset(), &snapshot);
}

#[test]
fn delete_clears_selection_and_cascades() {
  let mut c = codex();
  let a = named(&mut c, "Seren");
  let b = named(&mut c, "Dravik");
  c.add_relation(&a, &b, "rival", "").unwrap().unwrap();
  c.add_relation(&b, &a, "enemy", "").unwrap().unwrap();
  c.set_selection(Some(&b));

  assert!(c.delete_character(&b).unwrap());

  assert!(c.selected().is_none());
  assert!(c.dataset().character(&b).is_none());
  assert_eq!(c.dataset().relations().count(), 0);
  assert_eq!(stored(&c)["relations"], json!([]));
}

#[test]
fn delete_keeps_unrelated_selection() {
  let mut c = codex();
  let a = named(&mut c, "Seren");
  let b = named(&mut c, "Dravik");
  c.set_selection(Some(&a));

  c.delete_character(&b).unwrap();
  assert_eq!(c.selected().map(|ch| ch.id.as_str()), Some(a.as_str()));
}

// ─── Relations ───────────────────────────────────────────────────────────────

#[test]
fn scenario_rival_then_delete_target() {
  let mut c = codex();
  let c1 = named(&mut c, "Seren");
  let c2 = named(&mut c, "Dravik");

  c.add_relation(&c1, &c2, "rival", "").unwrap();
  let rels = c.relations_for(&c1);
  assert_eq!(rels.len(), 1);
  assert_eq!(rels[0].relation.kind, "rival");
  assert_eq!(rels[0].other_name, "Dravik");
  assert!(c.relations_for(&c2).is_empty());
  assert_eq!(c.relations_to(&c2)[0].other_name, "Seren");

  c.delete_character(&c2).unwrap();
  assert!(c.relations_for(&c1).is_empty());
}

#[test]
fn add_relation_is_idempotent_per_edge() {
  let mut c = codex();
  let a = named(&mut c, "A");
  let b = named(&mut c, "B");

  assert!(c.add_relation(&a, &b, "ally", "first").unwrap().is_some());
  assert!(c.add_relation(&a, &b, "ally", "second").unwrap().is_none());
  assert!(c.add_relation(&a, &b, "mentor", "").unwrap().is_some());
  assert!(c.add_relation(&b, &a, "ally", "").unwrap().is_some());

  assert_eq!(c.dataset().relations().count(), 3);
}

#[test]
fn blank_kind_defaults_to_ally_and_dedupes() {
  let mut c = codex();
  let a = named(&mut c, "A");
  let b = named(&mut c, "B");

  let rel = c.add_relation(&a, &b, "", "").unwrap().unwrap();
  assert_eq!(rel.kind, "ally");
  assert!(c.add_relation(&a, &b, "  ", "").unwrap().is_none());
  assert!(c.add_relation(&a, &b, "ally", "").unwrap().is_none());
}

#[test]
fn add_relation_rejects_bad_endpoints() {
  let mut c = codex();
  let a = named(&mut c, "A");

  assert!(c.add_relation(&a, &a, "rival", "").unwrap().is_none());
  assert!(c.add_relation("", &a, "rival", "").unwrap().is_none());
  assert!(c.add_relation(&a, "", "rival", "").unwrap().is_none());
  assert!(c.add_relation(&a, "ghost", "rival", "").unwrap().is_none());
  assert_eq!(c.dataset().relations().count(), 0);
}

#[test]
fn relations_are_newest_first_and_removable() {
  let mut c = codex();
  let a = named(&mut c, "A");
  let b = named(&mut c, "B");
  let first = c.add_relation(&a, &b, "ally", "").unwrap().unwrap();
  let second = c.add_relation(&a, &b, "rival", "").unwrap().unwrap();

  let kinds: Vec<_> = c.relations_for(&a).iter().map(|r| r.relation.kind.clone()).collect();
  assert_eq!(kinds, ["rival", "ally"]);

  assert!(c.remove_relation(&second.id).unwrap());
  assert!(!c.remove_relation("missing").unwrap());
  let left: Vec<_> = c.dataset().relations().map(|r| r.id.clone()).collect();
  assert_eq!(left, [first.id]);
}

#[test]
fn dangling_target_resolves_to_placeholder() {
  let raw = json!({
    "characters": [{ "id": "a", "name": "Seren" }],
    "relations": [{ "id": "r", "fromId": "a", "toId": "gone", "type": "ally" }],
  });
  let mut c = codex();
  c.import_backup(&raw.to_string()).unwrap();

  let rels = c.relations_for("a");
  assert_eq!(rels.len(), 1);
  assert_eq!(rels[0].other_name, MISSING_TARGET_NAME);
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[test]
fn favorites_first_then_stored_order() {
  let mut c = codex();
  let a = named(&mut c, "A");
  let b = named(&mut c, "B");
  let fav = named(&mut c, "Fav");
  let d = named(&mut c, "D");
  c.update_character(&fav, CharacterPatch { favorite: Some(true), ..Default::default() })
    .unwrap();

  let names: Vec<_> = c.filtered_characters("", "").iter().map(|ch| ch.id.clone()).collect();
  // Newest first among non-favorites.
  assert_eq!(names, [fav, d, b, a]);
}

#[test]
fn favorites_keep_their_stored_order() {
  let mut c = codex();
  let x = named(&mut c, "X");
  let a = named(&mut c, "A");
  let y = named(&mut c, "Y");
  let b = named(&mut c, "B");
  // Marking order must not matter; only stored order does.
  for id in [&y, &x] {
    c.update_character(id, CharacterPatch { favorite: Some(true), ..Default::default() })
      .unwrap();
  }

  let ids: Vec<_> = c.filtered_characters("", "").iter().map(|ch| ch.id.clone()).collect();
  assert_eq!(ids, [y.clone(), x.clone(), b, a]);

  let favorites: Vec<_> = c
    .filtered_characters("", "")
    .iter()
    .take_while(|ch| ch.favorite)
    .map(|ch| ch.id.clone())
    .collect();
  assert_eq!(favorites, [y, x]);
}

#[test]
fn search_is_case_insensitive_substring() {
  let mut c = codex();
  let id = named(&mut c, "Kael Varyn");
  named(&mut c, "Seren");

  for needle in ["varyn", "KAEL", "  ael va  "] {
    let hits = c.filtered_characters(needle, "");
    assert_eq!(hits.len(), 1, "{needle}");
    assert_eq!(hits[0].id, id);
  }
  assert!(c.filtered_characters("kaelvaryn", "").is_empty());
}

#[test]
fn search_covers_long_form_fields_and_status() {
  let mut c = codex();
  let id = named(&mut c, "Seren");
  c.update_character(&id, CharacterPatch {
    lore: Some("Exiled from the Ordem Real".into()),
    status: Some(CharacterStatus::Missing),
    ..Default::default()
  })
  .unwrap();

  assert_eq!(c.filtered_characters("ordem real", "").len(), 1);
  assert_eq!(c.filtered_characters("missing", "").len(), 1);
}

#[test]
fn tag_filter_is_exact_and_case_insensitive() {
  let mut c = codex();
  let id = named(&mut c, "Seren");
  named(&mut c, "Dravik");
  c.update_character(&id, CharacterPatch {
    tags: Some(vec!["Arcanyth".into(), "Luxúria".into()]),
    ..Default::default()
  })
  .unwrap();

  assert_eq!(c.filtered_characters("", "arcanyth").len(), 1);
  assert_eq!(c.filtered_characters("", " LUXÚRIA ").len(), 1);
  assert!(c.filtered_characters("", "arcany").is_empty());
  assert!(c.filtered_characters("dravik", "arcanyth").is_empty());
}

#[test]
fn session_filters_drive_visible_characters() {
  let mut c = codex();
  named(&mut c, "Seren");
  named(&mut c, "Dravik");

  c.set_search_text("dra");
  assert_eq!(c.visible_characters().len(), 1);
  c.set_search_text("");
  c.set_tag_filter("none");
  assert!(c.visible_characters().is_empty());
}

#[test]
fn all_tags_are_distinct_and_collated() {
  let mut c = codex();
  let a = named(&mut c, "A");
  let b = named(&mut c, "B");
  c.update_character(&a, CharacterPatch {
    tags: Some(vec!["Mago".into(), "Luxúria".into(), "Mago".into()]),
    ..Default::default()
  })
  .unwrap();
  c.update_character(&b, CharacterPatch {
    tags: Some(vec!["arcanyth".into(), "Luxuria".into()]),
    ..Default::default()
  })
  .unwrap();

  assert_eq!(c.all_tags(), ["arcanyth", "Luxuria", "Luxúria", "Mago"]);
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[test]
fn selecting_unknown_id_changes_nothing() {
  let mut c = codex();
  let id = named(&mut c, "Seren");
  c.set_view(View::Backup);
  c.set_selection(Some(&id));
  assert_eq!(c.session().view, View::Characters);

  c.set_view(View::WorldCatalogs);
  let before = c.session().clone();
  c.set_selection(Some("ghost"));
  assert_eq!(c.session(), &before);

  c.set_selection(None);
  assert!(c.selected().is_none());
}

#[test]
fn listeners_fire_on_mutations_only() {
  let mut c = codex();
  let hits = Rc::new(Cell::new(0));
  let counter = Rc::clone(&hits);
  c.subscribe(move || counter.set(counter.get() + 1));

  let id = c.create_character().unwrap().id;
  assert_eq!(hits.get(), 1);

  c.update_character("ghost", CharacterPatch::default()).unwrap();
  c.add_relation(&id, &id, "ally", "").unwrap();
  c.set_selection(Some("ghost"));
  c.import_backup("{not json").unwrap_err();
  assert_eq!(hits.get(), 1);

  c.set_search_text("x");
  c.delete_character(&id).unwrap();
  assert_eq!(hits.get(), 3);
}

#[test]
fn catalogs_are_parsed_line_by_line() {
  let mut c = codex();
  assert_eq!(c.continents(), DEFAULT_CONTINENTS);
  assert_eq!(c.clans(), DEFAULT_CLANS);

  c.set_catalogs("  Varyon \n\n Nova Terra\r\n", "").unwrap();
  assert_eq!(c.continents(), ["Varyon", "Nova Terra"]);
  assert!(c.clans().is_empty());
  assert_eq!(stored(&c)["continents"], json!(["Varyon", "Nova Terra"]));
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[test]
fn empty_slot_loads_fresh_dataset() {
  let p = Persistence::new(MemorySlot::new());
  let data = p.load().unwrap();
  assert_eq!(data.continents, DEFAULT_CONTINENTS);
  assert!(data.characters.is_empty() && data.relations.is_empty());
}

#[test]
fn corrupt_slot_falls_back_to_fresh_dataset() {
  for raw in ["{not json", "42", "[1,2]", "null"] {
    let p = Persistence::new(MemorySlot::with_entry(STORAGE_KEY, raw));
    let data = p.load().unwrap();
    assert_eq!(data.clans, DEFAULT_CLANS, "{raw}");
    assert!(data.characters.is_empty());
  }
}

#[test]
fn partial_document_gets_missing_fields() {
  let raw = json!({
    "characters": [{ "id": "x", "name": "Seren", "status": "vivo" }],
    "continents": "not a list",
  });
  let p = Persistence::new(MemorySlot::with_entry(STORAGE_KEY, raw.to_string()));
  let data = p.load().unwrap();

  assert_eq!(data.meta.version, "3.0.0");
  assert_eq!(data.continents, DEFAULT_CONTINENTS);
  assert!(data.relations.is_empty());
  let seren = data.character("x").unwrap();
  assert_eq!(seren.status, CharacterStatus::Alive);
  assert!(seren.tags.is_empty());
}

#[test]
fn meta_fields_are_repaired_one_at_a_time() {
  let raw = json!({
    "meta": {
      "version": 3,
      "createdAt": "2024-01-02T03:04:05Z",
      "updatedAt": false,
      "author": "Lia",
    },
    "characters": [],
  });
  let data = validate_backup(&raw.to_string()).unwrap();

  assert_eq!(data.meta.version, "3.0.0");
  assert_eq!(data.meta.created_at.to_rfc3339(), "2024-01-02T03:04:05+00:00");
  assert!(data.meta.updated_at > data.meta.created_at);
  assert_eq!(data.meta.extra["author"], json!("Lia"));

  let out: Value = serde_json::from_str(&export(&data).unwrap()).unwrap();
  assert_eq!(out["meta"]["author"], json!("Lia"));
  assert_eq!(validate_backup(&out.to_string()).unwrap(), data);
}

#[test]
fn save_restamps_meta_and_reloads_equal() {
  let mut slot = MemorySlot::new();
  let mut p = Persistence::new(&mut slot);
  let mut data = Dataset::fresh();
  let created = data.meta.updated_at;
  p.save(&mut data).unwrap();
  assert!(data.meta.updated_at >= created);

  assert_eq!(p.load().unwrap(), data);
}

#[test]
fn failed_write_leaves_state_untouched() {
  let slot = FlakySlot::default();
  let fail = Rc::clone(&slot.fail);
  let mut c = Codex::open(slot).unwrap();
  let id = c.create_character().unwrap().id;
  let snapshot = c.dataset().clone();

  fail.set(true);
  let err = c.delete_character(&id).unwrap_err();
  assert!(matches!(err, Error::Persistence(_)));
  assert_eq!(c.dataset(), &snapshot);
  assert_eq!(c.session().selected_id.as_deref(), Some(id.as_str()));

  assert!(c.import_backup(r#"{"characters": []}"#).is_err());
  assert_eq!(c.dataset(), &snapshot);
}

#[test]
fn ledger_reopens_from_its_own_writes() {
  let mut slot = MemorySlot::new();
  let id = {
    let mut ledger = Ledger::open(&mut slot).unwrap();
    ledger.create_character().unwrap().id
  };
  let ledger = Ledger::open(&mut slot).unwrap();
  assert!(ledger.dataset().contains_character(&id));
}

// ─── Backup ──────────────────────────────────────────────────────────────────

#[test]
fn export_then_validate_is_identity() {
  let mut c = codex();
  let a = named(&mut c, "Seren");
  let b = named(&mut c, "Dravik");
  c.update_character(&a, CharacterPatch {
    tags: Some(vec!["Arcanyth".into()]),
    favorite: Some(true),
    ..Default::default()
  })
  .unwrap();
  c.add_relation(&a, &b, "rival", "old grudge").unwrap();

  let doc = c.export_backup().unwrap();
  assert!(doc.contains("\n  \"meta\""), "pretty-printed");
  assert_eq!(&validate_backup(&doc).unwrap(), c.dataset());
}

#[test]
fn import_round_trip_through_controller() {
  let mut c = codex();
  let a = named(&mut c, "Seren");
  let b = named(&mut c, "Dravik");
  c.add_relation(&a, &b, "rival", "").unwrap();
  let before = c.dataset().clone();
  let doc = c.export_backup().unwrap();

  c.reset_all().unwrap();
  assert_eq!(c.dataset().characters().count(), 0);

  c.import_backup(&doc).unwrap();
  let after = c.dataset();
  assert_eq!(after.characters, before.characters);
  assert_eq!(after.relations, before.relations);
  assert_eq!(after.continents, before.continents);
  assert_eq!(after.meta.version, before.meta.version);
  assert_eq!(after.meta.created_at, before.meta.created_at);
}

#[test]
fn import_rejects_and_preserves_state() {
  let mut c = codex();
  let id = named(&mut c, "Seren");
  c.set_search_text("ser");
  let data = c.dataset().clone();
  let session = c.session().clone();

  let cases = [
    ("{not json", None),
    ("[]", Some(BackupRejection::NotAnObject)),
    ("\"text\"", Some(BackupRejection::NotAnObject)),
    (r#"{"relations": []}"#, Some(BackupRejection::MissingCharacters)),
    (r#"{"characters": {}}"#, Some(BackupRejection::MissingCharacters)),
  ];
  for (raw, expected) in cases {
    let err = c.import_backup(raw).unwrap_err();
    match (err, expected) {
      (Error::InvalidBackup(BackupRejection::Malformed(_)), None) => {}
      (Error::InvalidBackup(got), Some(want)) => assert_eq!(got, want, "{raw}"),
      (other, _) => panic!("unexpected error for {raw}: {other}"),
    }
  }

  assert_eq!(c.dataset(), &data);
  assert_eq!(c.session(), &session);
  assert_eq!(c.selected().map(|ch| ch.id.clone()), Some(id));
}

#[test]
fn import_replaces_wholesale_and_clears_session() {
  let mut c = codex();
  let old = named(&mut c, "Seren");
  c.set_search_text("ser");
  c.set_tag_filter("x");

  let raw = json!({ "characters": [{ "id": "n1", "name": "Nyx" }] });
  c.import_backup(&raw.to_string()).unwrap();

  assert!(c.dataset().character(&old).is_none());
  assert!(c.dataset().character("n1").is_some());
  assert!(c.dataset().relations.is_empty());
  assert_eq!(c.dataset().meta.version, "3.0.0");
  assert!(c.session().selected_id.is_none());
  assert!(c.session().search_text.is_empty() && c.session().tag_filter.is_empty());
  assert_eq!(stored(&c)["characters"][0]["id"], json!("n1"));
}

#[test]
fn malformed_records_pass_through() {
  let raw = json!({
    "meta": { "version": "2.9.0", "createdAt": "2024-01-02T03:04:05.000Z" },
    "characters": [
      42,
      { "id": "ok", "name": "Seren", "mood": "grim", "tags": ["a"] },
      { "id": "bad", "createdAt": "last winter" },
    ],
    "relations": ["??", { "id": "r1", "fromId": "ok", "toId": "bad", "type": "ally" }],
    "theme": "dark",
  });
  let data = validate_backup(&raw.to_string()).unwrap();

  assert_eq!(data.meta.version, "2.9.0");
  assert_eq!(data.characters.len(), 3);
  assert_eq!(data.characters[0], Record::Opaque(json!(42)));
  assert!(matches!(data.characters[2], Record::Opaque(_)));
  assert_eq!(data.characters().count(), 1);
  assert_eq!(data.character("ok").unwrap().extra["mood"], json!("grim"));
  assert_eq!(data.relations.len(), 2);

  let out: Value = serde_json::from_str(&export(&data).unwrap()).unwrap();
  assert_eq!(out["characters"][0], json!(42));
  assert_eq!(out["characters"][1]["mood"], json!("grim"));
  assert_eq!(out["characters"][2], json!({ "id": "bad", "createdAt": "last winter" }));
  assert_eq!(out["relations"][0], json!("??"));
  assert_eq!(out["theme"], json!("dark"));
}

#[test]
fn cascade_also_drops_opaque_relations() {
  let raw = json!({
    "characters": [{ "id": "a", "name": "A" }, { "id": "b", "name": "B" }],
    "relations": [
      { "id": "r1", "fromId": "a", "toId": "b", "type": 7 },
      { "id": "r2", "fromId": "b", "toId": "a", "type": "ally" },
    ],
  });
  let mut c = codex();
  c.import_backup(&raw.to_string()).unwrap();
  assert!(matches!(c.dataset().relations[0], Record::Opaque(_)));

  c.delete_character("a").unwrap();
  assert!(c.dataset().relations.is_empty());
}

#[test]
fn off_type_scalars_keep_the_character_usable() {
  let raw = json!({
    "characters": [{
      "id": "k",
      "name": "Kael Varyn",
      "age": 30,
      "race": null,
      "status": 5,
      "favorite": null,
      "tags": "Arcanyth,  #rei",
    }],
  });
  let mut c = codex();
  c.import_backup(&raw.to_string()).unwrap();

  assert!(matches!(c.dataset().characters[0], Record::Typed(_)));
  assert_eq!(c.filtered_characters("", "").len(), 1);
  assert_eq!(c.filtered_characters("kael", "").len(), 1);
  assert_eq!(c.filtered_characters("30", "").len(), 1);
  assert_eq!(c.filtered_characters("", "REI").len(), 1);

  let kael = c.dataset().character("k").unwrap();
  assert_eq!(kael.age, "30");
  assert_eq!(kael.race, "");
  assert_eq!(kael.status, CharacterStatus::Unknown);
  assert!(!kael.favorite);
  assert_eq!(kael.tags, ["Arcanyth", "rei"]);

  c.set_selection(Some("k"));
  assert_eq!(c.selected().map(|ch| ch.name.as_str()), Some("Kael Varyn"));
  assert!(c.delete_character("k").unwrap());
  assert!(c.dataset().characters.is_empty());
}

#[test]
fn opaque_character_is_deleted_by_raw_id() {
  let raw = json!({
    "characters": [
      { "id": "relic", "name": "Relic", "createdAt": "last winter" },
      { "id": "a", "name": "A" },
    ],
    "relations": [
      { "id": "r1", "fromId": "a", "toId": "relic", "type": "ally" },
      { "id": "r2", "fromId": "relic", "toId": "a", "type": 3 },
    ],
  });
  let mut c = codex();
  c.import_backup(&raw.to_string()).unwrap();
  assert!(matches!(c.dataset().characters[0], Record::Opaque(_)));

  assert!(c.delete_character("relic").unwrap());
  assert_eq!(c.dataset().characters.len(), 1);
  assert!(c.dataset().relations.is_empty());
  assert_eq!(stored(&c)["characters"][0]["id"], json!("a"));
  assert_eq!(stored(&c)["characters"].as_array().map(Vec::len), Some(1));
}

#[test]
fn reset_restores_defaults() {
  let mut c = codex();
  named(&mut c, "Seren");
  c.set_catalogs("Only", "One").unwrap();
  c.set_tag_filter("x");

  c.reset_all().unwrap();
  assert!(c.dataset().characters.is_empty());
  assert_eq!(c.continents(), DEFAULT_CONTINENTS);
  assert_eq!(c.session().tag_filter, "");
  assert_eq!(stored(&c)["characters"], json!([]));
}

#[test]
fn filename_embeds_tag_and_date() {
  let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
  assert_eq!(backup_filename(date), "codex-backup-v3-2026-03-09.json");
}

#[test]
fn status_labels_parse_leniently() {
  assert_eq!(CharacterStatus::from_label("DEAD"), CharacterStatus::Dead);
  assert_eq!(CharacterStatus::from_label("desaparecido"), CharacterStatus::Missing);
  assert_eq!(CharacterStatus::from_label("zombie"), CharacterStatus::Unknown);
  assert_eq!(serde_json::to_value(CharacterStatus::Missing).unwrap(), json!("missing"));

  for status in CharacterStatus::iter() {
    assert_eq!(CharacterStatus::from_label(status.as_ref()), status);
  }
}

#[test]
fn suggested_kinds_are_stored_verbatim() {
  let mut c = codex();
  let a = named(&mut c, "A");
  let b = named(&mut c, "B");
  for kind in SUGGESTED_KINDS {
    let added = c.add_relation(&a, &b, kind, "").unwrap().expect("new edge");
    assert_eq!(added.kind, kind);
  }
  assert_eq!(c.relations_to(&b).len(), SUGGESTED_KINDS.len());
  assert!(c.add_relation(&a, &b, "  ", "").unwrap().is_none(), "blank means ally");
}

// ─── Properties ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
  Create,
  Delete(usize),
  Relate(usize, usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
  prop_oneof![
    Just(Op::Create),
    (0usize..8).prop_map(Op::Delete),
    (0usize..8, 0usize..8, 0usize..3).prop_map(|(a, b, k)| Op::Relate(a, b, k)),
  ]
}

proptest! {
  #[test]
  fn no_relation_outlives_its_endpoints(ops in proptest::collection::vec(op(), 1..40)) {
    let mut c = codex();
    let kinds = ["ally", "rival", ""];

    for op in ops {
      let ids: Vec<String> = c.dataset().characters().map(|ch| ch.id.clone()).collect();
      match op {
        Op::Create => { c.create_character().unwrap(); }
        Op::Delete(i) if !ids.is_empty() => {
          let id = &ids[i % ids.len()];
          c.delete_character(id).unwrap();
          prop_assert!(c.dataset().relations().all(|r| !r.touches(id)));
        }
        Op::Relate(a, b, k) if !ids.is_empty() => {
          let (from, to) = (&ids[a % ids.len()], &ids[b % ids.len()]);
          c.add_relation(from, to, kinds[k], "").unwrap();
        }
        _ => {}
      }

      let data = c.dataset();
      for r in data.relations() {
        prop_assert!(data.contains_character(&r.from_id));
        prop_assert!(data.contains_character(&r.to_id));
        prop_assert_ne!(&r.from_id, &r.to_id);
      }
    }
  }

  #[test]
  fn self_relation_never_created(kind in "[a-z]{0,8}", note in ".{0,16}") {
    let mut c = codex();
    let id = c.create_character().unwrap().id;
    prop_assert!(c.add_relation(&id, &id, &kind, &note).unwrap().is_none());
    prop_assert_eq!(c.dataset().relations().count(), 0);
  }

  #[test]
  fn duplicate_edges_collapse(kind in "[a-z]{1,8}", repeats in 1usize..5) {
    let mut c = codex();
    let a = c.create_character().unwrap().id;
    let b = c.create_character().unwrap().id;
    for _ in 0..repeats {
      c.add_relation(&a, &b, &kind, "").unwrap();
    }
    prop_assert_eq!(c.dataset().relations().count(), 1);
  }
}
