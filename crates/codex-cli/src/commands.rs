//! Subcommand dispatch. Every command goes through the [`Codex`] controller.

use std::{io::Write as _, path::Path};

use anyhow::{Context, Result, bail};
use chrono::Local;
use codex_core::{Codex, Error, character::CharacterPatch, slot::KeyValueSlot, tags::parse_tags};

use crate::{Command, EditArgs, output};

pub fn run<S: KeyValueSlot>(codex: &mut Codex<S>, command: Command) -> Result<()> {
  match command {
    Command::List { search, tag } => {
      codex.set_search_text(&search);
      codex.set_tag_filter(&tag);
      output::character_list(&codex.visible_characters());
    }

    Command::Tags => {
      for tag in codex.all_tags() {
        println!("{tag}");
      }
    }

    Command::New { name } => {
      let character = codex.create_character()?;
      if let Some(name) = name {
        codex.update_character(&character.id, CharacterPatch {
          name: Some(name),
          ..Default::default()
        })?;
      }
      println!("{}", character.id);
    }

    Command::Show { id } => {
      codex.set_selection(Some(&id));
      let Some(character) = codex.selected() else {
        bail!("no character with id {id}");
      };
      output::character_sheet(
        character,
        &codex.relations_for(&id),
        &codex.relations_to(&id),
      );
    }

    Command::Edit(args) => {
      let id = args.id.clone();
      let patch = patch_from(args);
      if patch.is_empty() {
        bail!("nothing to change; pass at least one field flag");
      }
      if !codex.update_character(&id, patch)? {
        bail!("no character with id {id}");
      }
    }

    Command::Delete { id } => {
      if !codex.delete_character(&id)? {
        bail!("no character with id {id}");
      }
    }

    Command::Relate { from, to, kind, note } => match codex.add_relation(&from, &to, &kind, &note)? {
      Some(relation) => println!("{}", relation.id),
      None => bail!(
        "relation not added: endpoints must be two different existing characters \
         and the same relation must not already exist"
      ),
    },

    Command::Unrelate { id } => {
      if !codex.remove_relation(&id)? {
        bail!("no relation with id {id}");
      }
    }

    Command::Catalogs { continents, clans } => {
      if continents.is_none() && clans.is_none() {
        output::catalogs(codex.continents(), codex.clans());
        return Ok(());
      }
      let continents_text = match continents {
        Some(path) => read_text(&path)?,
        None => codex.continents().join("\n"),
      };
      let clans_text = match clans {
        Some(path) => read_text(&path)?,
        None => codex.clans().join("\n"),
      };
      codex.set_catalogs(&continents_text, &clans_text)?;
      output::catalogs(codex.continents(), codex.clans());
    }

    Command::Export { out } => {
      let doc = codex.export_backup()?;
      match out {
        Some(path) if path.as_os_str() == "-" => {
          let mut stdout = std::io::stdout().lock();
          stdout.write_all(doc.as_bytes())?;
          writeln!(stdout)?;
        }
        out => {
          let path = out.unwrap_or_else(|| codex.backup_filename(Local::now().date_naive()).into());
          std::fs::write(&path, doc)
            .with_context(|| format!("writing backup to {}", path.display()))?;
          eprintln!("backup written to {}", path.display());
        }
      }
    }

    Command::Import { path } => {
      let raw = read_text(&path)?;
      match codex.import_backup(&raw) {
        Ok(()) => eprintln!(
          "backup imported: {} characters, {} relations",
          codex.dataset().characters.len(),
          codex.dataset().relations.len(),
        ),
        Err(e @ Error::InvalidBackup(_)) => bail!("{}: {e}", path.display()),
        Err(e) => return Err(e).context("importing backup"),
      }
    }

    Command::Reset { yes } => {
      if !yes {
        bail!("reset erases every character and relation; re-run with --yes to confirm");
      }
      codex.reset_all()?;
    }
  }
  Ok(())
}

fn patch_from(args: EditArgs) -> CharacterPatch {
  CharacterPatch {
    name:        args.name,
    alias:       args.alias,
    race:        args.race,
    age:         args.age,
    status:      args.status,
    continent:   args.continent,
    clan:        args.clan,
    tags:        args.tags.as_deref().map(parse_tags),
    appearance:  args.appearance,
    personality: args.personality,
    lore:        args.lore,
    powers:      args.powers,
    weaknesses:  args.weaknesses,
    notes:       args.notes,
    favorite:    args.favorite,
  }
}

fn read_text(path: &Path) -> Result<String> {
  std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
