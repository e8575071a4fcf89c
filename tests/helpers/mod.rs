#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use diarist::diary::store::EntryStore;
use diarist::embedding::{EmbeddingProvider, EMBEDDING_DIM};
use diarist::generation::AnswerGenerator;
use diarist::{DiaryError, DiaryPipeline};
use tempfile::TempDir;

/// A store backed by a fresh temp directory. Keep the `TempDir` alive.
pub fn temp_store() -> (TempDir, EntryStore) {
    let tmp = TempDir::new().unwrap();
    let store = EntryStore::new(tmp.path().join("diary.json"));
    (tmp, store)
}

/// Seed a store file with raw JSON.
pub fn write_store_file(store: &EntryStore, json: &str) {
    std::fs::write(store.path(), json).unwrap();
}

/// Deterministic bag-of-words embedding: each lowercase word bumps one
/// dimension chosen by an FNV-1a hash. Texts sharing words score higher.
pub struct WordHashEmbedding;

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf29ce484222325u64, |h, b| {
        (h ^ b as u64).wrapping_mul(0x100000001b3)
    })
}

impl EmbeddingProvider for WordHashEmbedding {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; EMBEDDING_DIM];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            v[(fnv1a(&word) % EMBEDDING_DIM as u64) as usize] += 1.0;
        }
        Ok(v)
    }
}

/// Fails on any text containing `poison`.
pub struct PoisonedEmbedding {
    pub poison: &'static str,
}

impl EmbeddingProvider for PoisonedEmbedding {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        anyhow::ensure!(!text.contains(self.poison), "cannot encode {:?}", text);
        WordHashEmbedding.embed(text)
    }
}

/// Counts how many texts it was asked to embed.
#[derive(Default)]
pub struct CountingEmbedding {
    pub calls: Mutex<usize>,
}

impl EmbeddingProvider for CountingEmbedding {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        *self.calls.lock().unwrap() += 1;
        WordHashEmbedding.embed(text)
    }
}

/// Records every (question, grounding) pair and answers with a fixed string.
pub struct RecordingGenerator {
    pub answer: String,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl RecordingGenerator {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerGenerator for RecordingGenerator {
    async fn generate(&self, question: &str, grounding: &str) -> Result<String, DiaryError> {
        self.calls
            .lock()
            .unwrap()
            .push((question.to_string(), grounding.to_string()));
        Ok(self.answer.clone())
    }

    fn model(&self) -> &str {
        "recording"
    }
}

/// Always fails as if the model server were down.
pub struct UnreachableGenerator;

#[async_trait]
impl AnswerGenerator for UnreachableGenerator {
    async fn generate(&self, _question: &str, _grounding: &str) -> Result<String, DiaryError> {
        Err(DiaryError::generation("connection refused"))
    }

    fn model(&self) -> &str {
        "unreachable"
    }
}

pub fn pipeline_with(
    store: EntryStore,
    embedding: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn AnswerGenerator>,
) -> DiaryPipeline {
    DiaryPipeline::new(store, embedding, generator)
}

/// Returns 3-dimensional vectors while declaring the default dimensionality.
pub struct TruncatedEmbedding;

impl EmbeddingProvider for TruncatedEmbedding {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, 0.0, 0.0])
    }
}
