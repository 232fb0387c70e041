//! Plain-text rendering for the terminal.

use codex_core::{character::Character, query::RelationView};

pub fn character_list(characters: &[&Character]) {
  if characters.is_empty() {
    println!("(no characters)");
    return;
  }
  for c in characters {
    let star = if c.favorite { '*' } else { ' ' };
    let tags = if c.tags.is_empty() {
      String::new()
    } else {
      format!("  #{}", c.tags.join(" #"))
    };
    println!("{star} {}  {}  [{}]{tags}", c.id, c.name, c.status);
  }
}

pub fn character_sheet(c: &Character, outbound: &[RelationView<'_>], inbound: &[RelationView<'_>]) {
  println!("{}{}", c.name, if c.favorite { "  *" } else { "" });
  let fields: [(&str, &str); 6] = [
    ("id", c.id.as_str()),
    ("alias", c.alias.as_str()),
    ("race", c.race.as_str()),
    ("age", c.age.as_str()),
    ("continent", c.continent.as_str()),
    ("clan", c.clan.as_str()),
  ];
  for (label, value) in fields {
    if !value.is_empty() {
      println!("  {label:<11} {value}");
    }
  }
  println!("  {:<11} {}", "status", c.status);
  if !c.tags.is_empty() {
    println!("  {:<11} {}", "tags", c.tags.join(", "));
  }

  let sections: [(&str, &str); 6] = [
    ("Appearance", c.appearance.as_str()),
    ("Personality", c.personality.as_str()),
    ("Lore", c.lore.as_str()),
    ("Powers", c.powers.as_str()),
    ("Weaknesses", c.weaknesses.as_str()),
    ("Notes", c.notes.as_str()),
  ];
  for (heading, body) in sections {
    if !body.trim().is_empty() {
      println!("\n{heading}\n{}", indent(body));
    }
  }

  if !outbound.is_empty() {
    println!("\nRelations");
    for view in outbound {
      relation_line("→", view);
    }
  }
  if !inbound.is_empty() {
    println!("\nReferenced by");
    for view in inbound {
      relation_line("←", view);
    }
  }
}

fn relation_line(arrow: &str, view: &RelationView<'_>) {
  let r = view.relation;
  let note = if r.note.is_empty() { String::new() } else { format!("  ({})", r.note) };
  println!("  {arrow} {:<10} {}{note}  [{}]", r.kind, view.other_name, r.id);
}

pub fn catalogs(continents: &[String], clans: &[String]) {
  println!("Continents");
  for name in continents {
    println!("  {name}");
  }
  println!("Clans");
  for name in clans {
    println!("  {name}");
  }
}

fn indent(text: &str) -> String {
  text.lines().map(|l| format!("  {l}")).collect::<Vec<_>>().join("\n")
}
