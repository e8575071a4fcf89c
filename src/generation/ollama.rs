//! Ollama `/api/generate` client.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{prompt, AnswerGenerator};
use crate::config::GenerationConfig;
use crate::error::DiaryError;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Answer generator backed by a local Ollama server.
pub struct OllamaGenerator {
    http: Client,
    endpoint: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let http = builder.build().context("failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: format!("{}/api/generate", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnswerGenerator for OllamaGenerator {
    async fn generate(&self, question: &str, grounding: &str) -> Result<String, DiaryError> {
        let prompt = prompt::render(question, grounding);
        let request = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            stream: false,
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "sending generate request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| DiaryError::generation(format!("request to {} failed: {e}", self.endpoint)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DiaryError::generation(format!("error reading response: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(DiaryError::generation(format!("HTTP {status}: {detail}")));
        }

        parse_answer(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Extract the answer text from a non-streaming `/api/generate` body.
fn parse_answer(body: &str) -> Result<String, DiaryError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| DiaryError::generation(format!("malformed response: {e}")))?;

    if let Some(error) = parsed.error {
        return Err(DiaryError::generation(error));
    }

    let answer = parsed
        .response
        .ok_or_else(|| DiaryError::generation("response has no `response` field"))?;

    if answer.trim().is_empty() {
        return Err(DiaryError::generation("empty response"));
    }
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_answer_reads_response_field() {
        let body = r#"{"model":"llama3.2","response":"You felt calm.","done":true}"#;
        assert_eq!(parse_answer(body).unwrap(), "You felt calm.");
    }

    #[test]
    fn parse_answer_rejects_garbage() {
        let err = parse_answer("<html>oops</html>").unwrap_err();
        assert!(matches!(err, DiaryError::Generation(_)));
    }

    #[test]
    fn parse_answer_requires_response_field() {
        let err = parse_answer(r#"{"done":true}"#).unwrap_err();
        assert!(err.to_string().contains("no `response` field"));
    }

    #[test]
    fn parse_answer_surfaces_model_error() {
        let err = parse_answer(r#"{"error":"model 'llama3.2' not found"}"#).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn parse_answer_rejects_blank_answer() {
        for body in [
            r#"{"model":"llama3.2","response":"","done":true}"#,
            r#"{"model":"llama3.2","response":"  \n ","done":true}"#,
        ] {
            let err = parse_answer(body).unwrap_err();
            assert!(matches!(err, DiaryError::Generation(_)), "{body}");
            assert!(err.to_string().contains("empty response"));
        }
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let config = GenerationConfig {
            base_url: "http://localhost:11434/".into(),
            ..Default::default()
        };
        let generator = OllamaGenerator::new(&config).unwrap();
        assert_eq!(generator.endpoint(), "http://localhost:11434/api/generate");
    }
}
