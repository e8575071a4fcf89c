//! Talk to your diary: dated journal entries answered through local semantic retrieval.
//!
//! Diarist stores one block of text per calendar day and answers free-text
//! questions about it with a minimal retrieval-augmented generation loop:
//!
//! 1. embed the question and every diary entry with a local multilingual
//!    sentence-embedding model,
//! 2. rank entries by cosine similarity and keep the top 3,
//! 3. join them into a `Date: … / Diary: …` grounding block,
//! 4. ask a language model (Ollama by default) to answer from that block.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`diary`]: Entry store, ranking, context assembly and the question pipeline
//! - [`embedding`]: Text-to-vector embedding via ONNX Runtime
//! - [`generation`]: Prompt template and language-model answer generation
//! - [`error`]: Pipeline error type

pub mod config;
pub mod diary;
pub mod embedding;
pub mod error;
pub mod generation;

pub use diary::pipeline::{AskOutcome, DiaryPipeline};
pub use error::{DiaryError, Result};
