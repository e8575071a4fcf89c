//! End-to-end question answering over the diary.
//!
//! [`DiaryPipeline`] owns the entry store and receives the embedding provider and
//! answer generator from its caller, which builds each of them exactly once at
//! startup. One call to [`DiaryPipeline::ask`] runs encode → rank → assemble →
//! generate to completion before returning.
//!
//! Every question re-embeds every entry. Nothing is cached between questions,
//! so cost grows linearly with the diary; a content-hash keyed cache would be
//! the first thing to add if that ever matters.

use std::sync::Arc;

use serde::Serialize;

use crate::diary::context::assemble;
use crate::diary::rank::{rank, Candidate, TOP_K};
use crate::diary::store::EntryStore;
use crate::diary::types::{DateKey, DiaryEntry, SaveOutcome, ScoredCandidate};
use crate::embedding::EmbeddingProvider;
use crate::error::{DiaryError, Result};
use crate::generation::AnswerGenerator;

/// Result of answering one question.
#[derive(Debug, Clone, Serialize)]
pub struct AskOutcome {
    pub question: String,
    /// The top-ranked entries, best first.
    pub candidates: Vec<ScoredCandidate>,
    /// The exact grounding text passed to the generator.
    pub grounding: String,
    pub answer: String,
}

pub struct DiaryPipeline {
    store: EntryStore,
    embedding: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn AnswerGenerator>,
}

impl DiaryPipeline {
    pub fn new(
        store: EntryStore,
        embedding: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self {
            store,
            embedding,
            generator,
        }
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    /// Save a note for `date`. See [`EntryStore::save`].
    pub fn save(&self, date: DateKey, text: &str) -> Result<SaveOutcome> {
        self.store.save(date, text)
    }

    /// Answer `question` from the diary.
    ///
    /// Returns `Ok(None)` without doing any work when the question is empty or
    /// whitespace. An empty diary still reaches the generator, with an empty
    /// grounding text.
    pub async fn ask(&self, question: &str) -> Result<Option<AskOutcome>> {
        if question.trim().is_empty() {
            tracing::debug!("empty question, nothing to do");
            return Ok(None);
        }

        let entries = self.store.entries();
        tracing::info!(entries = entries.len(), "answering question");

        let candidates = self.retrieve(question, entries).await?;
        let grounding = assemble(&candidates);

        for c in &candidates {
            tracing::debug!(date = %c.date, score = c.score, "selected entry");
        }

        let answer = self.generator.generate(question, &grounding).await?;
        tracing::info!(
            model = %self.generator.model(),
            answer_len = answer.len(),
            "answer generated"
        );

        Ok(Some(AskOutcome {
            question: question.to_string(),
            candidates,
            grounding,
            answer,
        }))
    }

    /// Embed the question and all entries, then keep the best [`TOP_K`].
    pub async fn retrieve(
        &self,
        question: &str,
        entries: Vec<DiaryEntry>,
    ) -> Result<Vec<ScoredCandidate>> {
        let provider = Arc::clone(&self.embedding);
        let question_text = question.to_string();

        // CPU-heavy → spawn_blocking
        let (question_vec, entries, entry_vecs) = tokio::task::spawn_blocking(move || {
            let question_vec = provider
                .embed(&question_text)
                .map_err(|e| DiaryError::encoding(format!("question: {e:#}")))?;
            if question_vec.len() != provider.dimensions() {
                return Err(DiaryError::encoding(format!(
                    "question embedding has {} dimensions, provider declares {}",
                    question_vec.len(),
                    provider.dimensions()
                )));
            }
            let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
            let entry_vecs = provider
                .embed_batch(&texts)
                .map_err(|e| DiaryError::encoding(format!("diary entries: {e:#}")))?;
            Ok::<_, DiaryError>((question_vec, entries, entry_vecs))
        })
        .await
        .map_err(|e| DiaryError::encoding(format!("embedding task failed: {e}")))??;

        if entry_vecs.len() != entries.len() {
            return Err(DiaryError::encoding(format!(
                "expected {} entry embeddings, got {}",
                entries.len(),
                entry_vecs.len()
            )));
        }

        let candidates: Vec<Candidate<'_>> = entries
            .iter()
            .zip(&entry_vecs)
            .map(|(entry, vector)| Candidate {
                date: &entry.date,
                text: &entry.text,
                vector,
            })
            .collect();

        rank(&question_vec, &candidates, TOP_K)
    }
}
