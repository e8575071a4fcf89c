use anyhow::Result;

use diarist::config::DiaristConfig;
use diarist::diary::context::format_candidate;

/// Answer a question from the terminal, showing the entries it was grounded on.
pub async fn ask(config: &DiaristConfig, question: &str) -> Result<()> {
    if question.trim().is_empty() {
        return Ok(());
    }

    let pipeline = super::build_pipeline(config)?;

    let Some(outcome) = pipeline.ask(question).await? else {
        return Ok(());
    };

    if outcome.candidates.is_empty() {
        println!("(no diary entries yet; answering without context)\n");
    }

    for candidate in &outcome.candidates {
        println!(
            "Similarity: {:.4} - Sentence: {}",
            candidate.score,
            format_candidate(candidate)
        );
        println!();
    }

    println!("Answer:");
    println!("{}", outcome.answer);

    Ok(())
}
