//! CLI `write` command: save a note to the diary.

use std::io::Read;

use anyhow::{Context, Result};

use diarist::config::DiaristConfig;
use diarist::diary::store::EntryStore;
use diarist::diary::types::{DateKey, SaveOutcome};

/// Save `text` (or stdin) under `date` (or today).
pub fn write(config: &DiaristConfig, date: Option<&str>, text: Option<String>) -> Result<()> {
    let date = match date {
        Some(d) => d.parse::<DateKey>()?,
        None => DateKey::today(),
    };

    let text = match text {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read note from stdin")?;
            buf.trim_end_matches('\n').to_string()
        }
    };

    let store = EntryStore::new(config.resolved_entries_path());
    let outcome = store.save(date, &text)?;

    match outcome {
        SaveOutcome::Created => println!("Saved new entry for {date}."),
        SaveOutcome::Appended => println!("Appended to the entry for {date}."),
        SaveOutcome::Duplicate => println!("{date} already has this note; nothing changed."),
        SaveOutcome::Empty => println!("Nothing to save."),
    }

    Ok(())
}
