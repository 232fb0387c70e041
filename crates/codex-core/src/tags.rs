//! Tag parsing and ordering.

use std::{cmp::Ordering, sync::LazyLock};

use regex::Regex;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// One or more commas, or a run of two or more whitespace characters. A single
/// space stays inside a tag so multi-word tags like `Ordem Real` survive.
static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"[,]+|\s{2,}").expect("static tag separator regex is valid")
});

/// Split a free-text tag field into tags.
///
/// Pieces are trimmed and a single leading `#` is stripped; pieces left empty
/// are dropped. Case and duplicates are preserved.
pub fn parse_tags(raw: &str) -> Vec<String> {
  SEPARATOR
    .split(raw)
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(|t| t.strip_prefix('#').unwrap_or(t))
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}

/// Accent- and case-folded form of `s` used for display ordering.
pub fn collation_key(s: &str) -> String {
  s.nfd()
    .filter(|c| !is_combining_mark(*c))
    .flat_map(char::to_lowercase)
    .collect()
}

/// Locale-style comparison: folded keys first, raw text as the tie-break so
/// the order is total.
pub fn compare(a: &str, b: &str) -> Ordering {
  collation_key(a)
    .cmp(&collation_key(b))
    .then_with(|| a.cmp(b))
}
