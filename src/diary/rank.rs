//! Cosine-similarity ranking of diary entries against a question.
//!
//! This is a full sort over every entry, not an approximate top-k. That is the
//! scalability ceiling of the design: fine for one person's diary (hundreds of
//! entries), not for large corpora, which would need an ANN index.

use crate::diary::types::ScoredCandidate;
use crate::error::{DiaryError, Result};

/// Number of entries handed to the answer generator.
pub const TOP_K: usize = 3;

/// An entry paired with its embedding, ready to be scored.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub date: &'a str,
    pub text: &'a str,
    pub vector: &'a [f32],
}

/// Cosine similarity between two vectors of equal length.
///
/// Returns 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Score every candidate against `question` and keep the best `k`.
///
/// Output is sorted by descending score. The sort is stable, so equal scores
/// keep the order the candidates were given in. Fewer than `k` candidates are
/// all returned; an empty input gives an empty output.
pub fn rank(question: &[f32], candidates: &[Candidate<'_>], k: usize) -> Result<Vec<ScoredCandidate>> {
    let mut scored = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.vector.len() != question.len() {
            return Err(DiaryError::encoding(format!(
                "embedding for {} has {} dimensions, question has {}",
                candidate.date,
                candidate.vector.len(),
                question.len()
            )));
        }
        scored.push(ScoredCandidate {
            score: cosine_similarity(question, candidate.vector),
            date: candidate.date.to_string(),
            text: candidate.text.to_string(),
        });
    }

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);
    Ok(scored)
}
