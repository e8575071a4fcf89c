//! Grounding-context assembly.

use crate::diary::types::ScoredCandidate;

/// Format one candidate as it appears in the grounding text.
pub fn format_candidate(candidate: &ScoredCandidate) -> String {
    format!("Date: {}\nDiary: {}", candidate.date, candidate.text)
}

/// Join the ranked candidates into the text block given to the language model.
///
/// Each candidate becomes `"Date: {date}\nDiary: {text}\n\n"`, in ranked order.
/// Entry text is never truncated.
pub fn assemble(ranked: &[ScoredCandidate]) -> String {
    ranked
        .iter()
        .map(|c| format!("{}\n\n", format_candidate(c)))
        .collect()
}
