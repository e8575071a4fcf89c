//! Diary record types.
//!
//! [`DateKey`] is the store's unique key, [`DiaryEntry`] a stored record,
//! [`ScoredCandidate`] a ranked entry for one question, and [`SaveOutcome`]
//! reports what a save did to the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DiaryError;

/// Calendar date used as the store key, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    /// Today's date in the local timezone.
    pub fn today() -> Self {
        Self(chrono::Local::now().date_naive())
    }
}

impl std::fmt::Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl std::str::FromStr for DateKey {
    type Err = DiaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), Self::FORMAT)
            .map(Self)
            .map_err(|_| DiaryError::InvalidDate(s.to_string()))
    }
}

/// One date's accumulated diary text.
///
/// `date` is kept as the raw key string from the store file so entries written
/// by hand with unusual keys still take part in retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub date: String,
    pub text: String,
}

/// An entry scored against a question, as shown to the user and fed to the assembler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub score: f32,
    /// Date label of the entry.
    pub date: String,
    pub text: String,
}

/// What a save did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    /// First entry for this date.
    Created,
    /// Text appended to an existing entry after a blank line.
    Appended,
    /// The same note was already saved for this date; nothing written.
    Duplicate,
    /// The note was empty or whitespace-only; nothing written.
    Empty,
}

impl SaveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Appended => "appended",
            Self::Duplicate => "duplicate",
            Self::Empty => "empty",
        }
    }

    /// Whether the store file was modified.
    pub fn wrote(&self) -> bool {
        matches!(self, Self::Created | Self::Appended)
    }
}

impl std::fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
