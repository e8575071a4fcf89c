//! Local ONNX Runtime embedding provider.
//!
//! Implements [`EmbeddingProvider`] using the paraphrase-multilingual-MiniLM-L12-v2
//! model via `ort`. Handles tokenization, inference, mean pooling, and L2 normalization.

use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::{Session, SessionInputValue};
use ort::value::Tensor;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer};

use super::{EmbeddingProvider, EMBEDDING_DIM};
use crate::config::EmbeddingConfig;

/// Maximum sequence length the multilingual MiniLM was trained at.
const MAX_SEQ_LEN: usize = 128;

/// Local ONNX-based multilingual embedding provider.
pub struct LocalEmbeddingProvider {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    inputs: ModelInputs,
}

/// Which optional inputs the loaded graph declares.
///
/// BERT-style exports take `token_type_ids`; XLM-R style exports reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ModelInputs {
    token_type_ids: bool,
}

impl ModelInputs {
    fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            token_type_ids: names.into_iter().any(|name| name == "token_type_ids"),
        }
    }
}

// Safety: Tokenizer is Send+Sync. Session is behind a Mutex.
// The Mutex guarantees exclusive access during run().
unsafe impl Send for LocalEmbeddingProvider {}
unsafe impl Sync for LocalEmbeddingProvider {}

impl LocalEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let cache_dir = crate::config::expand_tilde(&config.cache_dir);
        let model_path = cache_dir.join("model.onnx");
        let tokenizer_path = cache_dir.join("tokenizer.json");

        anyhow::ensure!(
            model_path.exists(),
            "ONNX model not found at {}. Run `diarist model download` first.",
            model_path.display()
        );
        anyhow::ensure!(
            tokenizer_path.exists(),
            "Tokenizer not found at {}. Run `diarist model download` first.",
            tokenizer_path.display()
        );

        let mut builder = Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .and_then(|b| b.with_intra_threads(4))
            .map_err(|e| anyhow::anyhow!("failed to configure ONNX session: {e}"))?;
        let session = builder
            .commit_from_file(&model_path)
            .context("failed to load ONNX model")?;

        let inputs = ModelInputs::from_names(session.inputs().iter().map(|i| i.name()));
        tracing::info!(
            model = %model_path.display(),
            name = %config.model,
            token_type_ids = inputs.token_type_ids,
            "ONNX model loaded"
        );

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer: {e}"))?;

        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("failed to set truncation: {e}"))?;

        let padding = padding_params(tokenizer.get_padding(), |token| tokenizer.token_to_id(token));
        tracing::debug!(pad_token = %padding.pad_token, pad_id = padding.pad_id, "batch padding");
        tokenizer.with_padding(Some(padding));

        tracing::info!(tokenizer = %tokenizer_path.display(), "tokenizer loaded");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            inputs,
        })
    }
}

impl EmbeddingProvider for LocalEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .context("embedding batch returned no vector")
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        // Step 1: Tokenize. An empty string still yields <s></s>.
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenization failed: {e}"))?;

        let batch_size = encodings.len();
        let seq_len = encodings[0].get_ids().len();

        // Step 2: Build flat input tensors as i64
        let mut input_ids_flat = Vec::with_capacity(batch_size * seq_len);
        let mut attention_mask_flat = Vec::with_capacity(batch_size * seq_len);

        for encoding in &encodings {
            input_ids_flat.extend(encoding.get_ids().iter().map(|&id| id as i64));
            attention_mask_flat.extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
        }

        let shape = vec![batch_size as i64, seq_len as i64];
        let input_ids_tensor =
            Tensor::from_array((shape.clone(), input_ids_flat.into_boxed_slice()))?;
        let attention_mask_tensor =
            Tensor::from_array((shape.clone(), attention_mask_flat.clone().into_boxed_slice()))?;

        let mut feeds = ort::inputs! {
            "input_ids" => input_ids_tensor,
            "attention_mask" => attention_mask_tensor,
        };
        if self.inputs.token_type_ids {
            // Single sentence, so every segment id is zero.
            let token_type_ids = vec![0i64; batch_size * seq_len];
            let token_type_ids_tensor =
                Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;
            feeds.push(("token_type_ids".into(), SessionInputValue::from(token_type_ids_tensor)));
        }

        // Step 3: Run ONNX inference
        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("session lock poisoned: {e}"))?;

        let outputs = session.run(feeds)?;

        // Step 4: Token embeddings, shape [batch, seq_len, 384].
        // The output name varies by ONNX export; fall back to index 0.
        let token_emb_value = outputs
            .get("token_embeddings")
            .or_else(|| outputs.get("last_hidden_state"))
            .unwrap_or_else(|| &outputs[0]);

        let (shape, data) = token_emb_value
            .try_extract_tensor::<f32>()
            .context("failed to extract token_embeddings tensor")?;

        let dims: &[i64] = &shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[2] == EMBEDDING_DIM as i64,
            "unexpected token_embeddings shape: {dims:?}, expected [batch, seq, {EMBEDDING_DIM}]"
        );
        let hidden_dim = dims[2] as usize;
        let actual_seq_len = dims[1] as usize;

        // Step 5: Mean pooling over unmasked tokens, then L2 normalize
        let results = (0..batch_size)
            .map(|b| {
                let mask = &attention_mask_flat[b * seq_len..(b + 1) * seq_len];
                let token_rows = &data[b * actual_seq_len * hidden_dim..(b + 1) * actual_seq_len * hidden_dim];
                l2_normalize(&mean_pool(token_rows, mask, hidden_dim))
            })
            .collect();

        Ok(results)
    }
}

/// Batch padding with the tokenizer's own pad token.
///
/// A padding config shipped in `tokenizer.json` is kept (forced to pad to the
/// longest sequence in the batch). Otherwise the pad token is looked up by
/// name, `<pad>` for XLM-R vocabularies and `[PAD]` for BERT ones.
fn padding_params(
    existing: Option<&PaddingParams>,
    token_to_id: impl Fn(&str) -> Option<u32>,
) -> PaddingParams {
    if let Some(existing) = existing {
        return PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..existing.clone()
        };
    }
    for token in ["<pad>", "[PAD]"] {
        if let Some(id) = token_to_id(token) {
            return PaddingParams {
                pad_id: id,
                pad_token: token.to_string(),
                ..Default::default()
            };
        }
    }
    PaddingParams::default()
}

/// Average the token rows whose attention mask is set.
fn mean_pool(token_rows: &[f32], mask: &[i64], hidden_dim: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden_dim];
    let mut count = 0.0f32;

    for (row, &m) in token_rows.chunks_exact(hidden_dim).zip(mask) {
        if m > 0 {
            for (acc, x) in sum.iter_mut().zip(row) {
                *acc += x;
            }
            count += 1.0;
        }
    }

    if count > 0.0 {
        for x in &mut sum {
            *x /= count;
        }
    }
    sum
}

/// L2-normalize a vector. Returns a zero vector if the input norm is zero.
fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}
