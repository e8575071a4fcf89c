//! JSON-file entry store.
//!
//! The whole diary is one JSON object mapping `YYYY-MM-DD` keys to the text
//! written on that date. Reads never fail: a missing or unparsable file is
//! treated as an empty diary. Writes replace the file atomically, and saves
//! through one [`EntryStore`] (or its clones) never interleave.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use tempfile::NamedTempFile;

use crate::diary::types::{DateKey, DiaryEntry, SaveOutcome};
use crate::error::{DiaryError, Result};

/// Separator placed between notes saved on the same date.
pub const NOTE_SEPARATOR: &str = "\n\n";

/// Date key → accumulated text, in file order.
pub type EntryMap = IndexMap<String, String>;

/// State of the store file on disk.
#[derive(Debug)]
pub enum StoreStatus {
    Missing,
    /// The file exists but cannot be read or is not a JSON object of strings.
    Unreadable(String),
    Ready(EntryMap),
}

/// File-backed diary store.
#[derive(Debug, Clone)]
pub struct EntryStore {
    path: PathBuf,
    /// Held across the read-modify-write of [`EntryStore::save`].
    save_lock: Arc<Mutex<()>>,
}

impl EntryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full mapping. Missing or corrupt files yield an empty map.
    pub fn load(&self) -> EntryMap {
        match self.inspect() {
            StoreStatus::Ready(map) => map,
            StoreStatus::Missing => {
                tracing::debug!(path = %self.path.display(), "no diary file yet, starting empty");
                EntryMap::new()
            }
            StoreStatus::Unreadable(reason) => {
                tracing::warn!(path = %self.path.display(), error = %reason, "diary file unusable, treating as empty");
                EntryMap::new()
            }
        }
    }

    /// Read the file and report what was found, without recovering.
    pub fn inspect(&self) -> StoreStatus {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StoreStatus::Missing,
            Err(e) => return StoreStatus::Unreadable(e.to_string()),
        };

        match serde_json::from_str::<EntryMap>(&contents) {
            Ok(map) => StoreStatus::Ready(map),
            Err(e) => StoreStatus::Unreadable(e.to_string()),
        }
    }

    /// All entries in store iteration order.
    pub fn entries(&self) -> Vec<DiaryEntry> {
        self.load()
            .into_iter()
            .map(|(date, text)| DiaryEntry { date, text })
            .collect()
    }

    /// Save a note under `date`, appending to any text already stored for that date.
    ///
    /// Empty notes and notes already present for the date leave the file untouched.
    pub fn save(&self, date: DateKey, note: &str) -> Result<SaveOutcome> {
        if note.trim().is_empty() {
            return Ok(SaveOutcome::Empty);
        }

        // Guards no data, so a poisoned lock is still usable.
        let _guard = self
            .save_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut map = match self.inspect() {
            StoreStatus::Ready(map) => map,
            StoreStatus::Missing => EntryMap::new(),
            StoreStatus::Unreadable(reason) => {
                self.set_aside(&reason)?;
                EntryMap::new()
            }
        };
        let key = date.to_string();

        let outcome = match map.get_mut(&key) {
            Some(existing) => {
                if contains_note(existing, note) {
                    SaveOutcome::Duplicate
                } else {
                    existing.push_str(NOTE_SEPARATOR);
                    existing.push_str(note);
                    SaveOutcome::Appended
                }
            }
            None => {
                map.insert(key.clone(), note.to_string());
                SaveOutcome::Created
            }
        };

        if outcome.wrote() {
            self.write(&map)?;
        }

        tracing::info!(date = %key, outcome = %outcome, "diary entry saved");
        Ok(outcome)
    }

    /// Keep an unusable store file as `<name>.bak` before it gets replaced.
    fn set_aside(&self, reason: &str) -> Result<()> {
        let backup = self.backup_path();
        tracing::warn!(
            path = %self.path.display(),
            backup = %backup.display(),
            error = %reason,
            "diary file unusable, starting a new one"
        );
        std::fs::copy(&self.path, &backup).map_err(|e| {
            DiaryError::store_write(format!("failed to back up {}: {e}", self.path.display()))
        })?;
        Ok(())
    }

    /// Where an unusable store file is preserved.
    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension("json.bak")
    }

    /// Replace the store file with `map`.
    ///
    /// The JSON goes to a uniquely named temp file next to the store, which is
    /// then renamed over it, so readers only ever see a complete file.
    fn write(&self, map: &EntryMap) -> Result<()> {
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent,
            None => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| {
            DiaryError::store_write(format!("failed to create {}: {e}", parent.display()))
        })?;

        let json = serde_json::to_string_pretty(map)
            .map_err(|e| DiaryError::store_write(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| {
            DiaryError::store_write(format!("failed to create temp file in {}: {e}", parent.display()))
        })?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| {
                DiaryError::store_write(format!("failed to write {}: {e}", tmp.path().display()))
            })?;
        tmp.persist(&self.path).map_err(|e| {
            DiaryError::store_write(format!("failed to replace {}: {}", self.path.display(), e.error))
        })?;

        Ok(())
    }
}

/// Whether `note` was already saved as one whole note inside `existing`.
///
/// Notes are joined by [`NOTE_SEPARATOR`], so a match must sit on note
/// boundaries; a note that merely occurs as a substring is not a duplicate.
fn contains_note(existing: &str, note: &str) -> bool {
    if existing == note {
        return true;
    }
    let leading = format!("{note}{NOTE_SEPARATOR}");
    let trailing = format!("{NOTE_SEPARATOR}{note}");
    let inner = format!("{NOTE_SEPARATOR}{note}{NOTE_SEPARATOR}");
    existing.starts_with(&leading) || existing.ends_with(&trailing) || existing.contains(&inner)
}
