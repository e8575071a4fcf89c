//! Errors surfaced by the question-answering pipeline.
//!
//! Store read problems never appear here: a missing or corrupt entry file is
//! recovered to an empty diary inside [`crate::diary::store`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiaryError>;

#[derive(Error, Debug)]
pub enum DiaryError {
    /// The embedding model failed on some input. Aborts the whole run.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The language model was unreachable or returned something unusable.
    #[error("answer generation failed: {0}")]
    Generation(String),

    #[error("invalid date key {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("failed to write diary store: {0}")]
    StoreWrite(String),
}

impl DiaryError {
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn store_write(msg: impl Into<String>) -> Self {
        Self::StoreWrite(msg.into())
    }
}
