//! Read-only views derived from a [`Dataset`].

use std::collections::BTreeSet;

use crate::{character::Character, dataset::Dataset, relation::Relation, tags};

/// Display name substituted for a relation target that no longer exists.
pub const MISSING_TARGET_NAME: &str = "Unknown (deleted)";

/// Characters visible under the given search text and tag filter.
///
/// Favorites come first; otherwise stored order (newest first) is kept. An
/// empty `tag_filter` or `search` disables that filter. Both are trimmed and
/// compared case-insensitively: the tag must equal one of the character's
/// tags, the search text must be a substring of its text fields.
pub fn filtered_characters<'a>(
  data: &'a Dataset,
  search: &str,
  tag_filter: &str,
) -> Vec<&'a Character> {
  let needle = search.trim().to_lowercase();
  let tag = tag_filter.trim().to_lowercase();

  let mut list: Vec<&Character> = data.characters().collect();
  // Stable: ties keep stored order.
  list.sort_by_key(|c| !c.favorite);

  if !tag.is_empty() {
    list.retain(|c| c.has_tag_ignore_case(&tag));
  }
  if !needle.is_empty() {
    list.retain(|c| c.search_blob().contains(&needle));
  }
  list
}

/// Every distinct tag in use, in locale-style order.
pub fn all_tags(data: &Dataset) -> Vec<String> {
  let distinct: BTreeSet<&str> = data
    .characters()
    .flat_map(|c| c.tags.iter().map(String::as_str))
    .collect();

  let mut sorted: Vec<String> = distinct.into_iter().map(str::to_owned).collect();
  sorted.sort_by(|a, b| tags::compare(a, b));
  sorted
}

// ─── Relations ───────────────────────────────────────────────────────────────

/// A relation with the name of the character on its far side resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationView<'a> {
  pub relation:   &'a Relation,
  /// Name of the other endpoint, or [`MISSING_TARGET_NAME`].
  pub other_name: &'a str,
}

/// Outbound relations of `character_id`, in stored order (newest first).
pub fn relations_for<'a>(data: &'a Dataset, character_id: &str) -> Vec<RelationView<'a>> {
  data
    .relations()
    .filter(|r| r.from_id == character_id)
    .map(|r| RelationView { relation: r, other_name: name_of(data, &r.to_id) })
    .collect()
}

/// Inbound relations of `character_id`, with the source's name resolved.
pub fn relations_to<'a>(data: &'a Dataset, character_id: &str) -> Vec<RelationView<'a>> {
  data
    .relations()
    .filter(|r| r.to_id == character_id)
    .map(|r| RelationView { relation: r, other_name: name_of(data, &r.from_id) })
    .collect()
}

fn name_of<'a>(data: &'a Dataset, id: &str) -> &'a str {
  data
    .character(id)
    .map(|c| c.name.as_str())
    .unwrap_or(MISSING_TARGET_NAME)
}
