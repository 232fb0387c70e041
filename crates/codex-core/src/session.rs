//! Session state — what the user is looking at. Never persisted.

/// Which pane the external UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
  #[default]
  Characters,
  WorldCatalogs,
  Backup,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
  pub selected_id: Option<String>,
  pub search_text: String,
  pub tag_filter:  String,
  pub view:        View,
}

impl Session {
  /// Forget the selection and any active search or tag filter. The view is
  /// kept.
  pub fn clear_selection_and_filters(&mut self) {
    self.selected_id = None;
    self.search_text.clear();
    self.tag_filter.clear();
  }
}

/// Parse catalog editor text: one entry per line, trimmed, blank lines
/// dropped.
pub fn parse_catalog_lines(text: &str) -> Vec<String> {
  text
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .map(str::to_owned)
    .collect()
}
