//! Answer generation through a language model.
//!
//! Provides the [`AnswerGenerator`] trait, the fixed prompt template in
//! [`prompt`], and an Ollama-backed implementation. The generator is created
//! once via [`create_generator`] and injected into the pipeline.

pub mod ollama;
pub mod prompt;

use anyhow::Result;
use async_trait::async_trait;

use crate::error::DiaryError;

/// Produces an answer to `question` grounded in `grounding`.
///
/// The call runs to completion: no streaming, no partial answers, no retries.
/// Failures are [`DiaryError::Generation`] and never an empty answer.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, question: &str, grounding: &str) -> Result<String, DiaryError>;

    /// Model identifier, for logs and diagnostics.
    fn model(&self) -> &str;
}

/// Create an answer generator from config.
///
/// Currently only `"ollama"` is supported.
pub fn create_generator(
    config: &crate::config::GenerationConfig,
) -> Result<Box<dyn AnswerGenerator>> {
    match config.provider.as_str() {
        "ollama" => Ok(Box::new(ollama::OllamaGenerator::new(config)?)),
        other => anyhow::bail!("unknown generation provider: {other}. Supported: ollama"),
    }
}
