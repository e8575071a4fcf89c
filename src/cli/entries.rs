use anyhow::Result;

use diarist::config::DiaristConfig;
use diarist::diary::store::EntryStore;

/// List stored entries with a one-line preview each.
pub fn entries(config: &DiaristConfig) -> Result<()> {
    let store = EntryStore::new(config.resolved_entries_path());
    let entries = store.entries();

    if entries.is_empty() {
        println!("No diary entries yet. Add one with `diarist write`.");
        return Ok(());
    }

    println!("{} entr{}\n", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
    for entry in &entries {
        println!("  {}  {}", entry.date, super::preview(&entry.text, 80));
    }

    Ok(())
}
