//! Multilingual sentence embeddings for semantic search.
//!
//! Wraps a MiniLM-family sentence-transformer exported to ONNX. Embeddings
//! are mean-pooled over the last hidden state (masked by attention) and
//! L2-normalized, so cosine similarity reduces to a dot product.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;

use crate::error::AnalysisError;

/// Sentence-transformer default sequence length.
const MAX_LENGTH: usize = 128;

/// Sentence-embedding model wrapper.
pub struct TextEmbedder {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
    /// Whether the exported graph expects a token_type_ids input.
    needs_token_types: bool,
}

impl TextEmbedder {
    /// Load the embedding model from `{model_dir}/{model_name}/`.
    ///
    /// Expects `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path, model_name: &str) -> Result<Self, AnalysisError> {
        let dir = model_dir.join(model_name);
        let model_path = dir.join("model.onnx");
        let tokenizer_path = dir.join("tokenizer.json");

        for path in [&model_path, &tokenizer_path] {
            if !path.exists() {
                return Err(AnalysisError::Model {
                    message: format!(
                        "Embedding model file not found at {path:?}. Run `cargolens models download` first."
                    ),
                });
            }
        }

        let session = Session::builder()
            .map_err(|e| AnalysisError::Model {
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(&model_path)
            .map_err(|e| AnalysisError::Model {
                message: format!("Failed to load embedding model: {e}"),
            })?;

        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            AnalysisError::Model {
                message: format!("Failed to load embedding tokenizer: {e}"),
            }
        })?;

        let needs_token_types = session
            .inputs()
            .iter()
            .any(|i| i.name() == "token_type_ids");

        tracing::debug!(
            "Loaded sentence embedder (inputs: {:?})",
            session
                .inputs()
                .iter()
                .map(|i| i.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            needs_token_types,
        })
    }

    /// Embed a batch of texts, one L2-normalized vector per input.
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        let batch_size = texts.len();
        if batch_size == 0 {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| AnalysisError::Model {
                message: format!("Tokenization failed: {e}"),
            })?;

        // Pad to the longest sequence in the batch, capped at MAX_LENGTH.
        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(1)
            .clamp(1, MAX_LENGTH);

        let mut input_ids = vec![0i64; batch_size * seq_len];
        let mut attention_mask = vec![0i64; batch_size * seq_len];
        for (i, encoding) in encodings.iter().enumerate() {
            for (j, &id) in encoding.get_ids().iter().take(seq_len).enumerate() {
                input_ids[i * seq_len + j] = id as i64;
                attention_mask[i * seq_len + j] = 1;
            }
        }

        let shape = vec![batch_size as i64, seq_len as i64];
        let ids_value = Value::from_array((shape.clone(), input_ids)).map_err(|e| {
            AnalysisError::Model {
                message: format!("Failed to create input_ids tensor: {e}"),
            }
        })?;
        let mask_value = Value::from_array((shape.clone(), attention_mask.clone())).map_err(
            |e| AnalysisError::Model {
                message: format!("Failed to create attention_mask tensor: {e}"),
            },
        )?;

        let mut session = self.session.lock().map_err(|e| AnalysisError::Model {
            message: format!("Embedder lock poisoned: {e}"),
        })?;

        let outputs = if self.needs_token_types {
            let types_value =
                Value::from_array((shape, vec![0i64; batch_size * seq_len])).map_err(|e| {
                    AnalysisError::Model {
                        message: format!("Failed to create token_type_ids tensor: {e}"),
                    }
                })?;
            session.run(ort::inputs![
                "input_ids" => ids_value,
                "attention_mask" => mask_value,
                "token_type_ids" => types_value,
            ])
        } else {
            session.run(ort::inputs![
                "input_ids" => ids_value,
                "attention_mask" => mask_value,
            ])
        }
        .map_err(|e| AnalysisError::Model {
            message: format!("Embedding inference failed: {e}"),
        })?;

        // First output is last_hidden_state [batch, seq, hidden].
        let (_, value) = outputs.iter().next().ok_or_else(|| AnalysisError::Model {
            message: "Embedding model produced no outputs".to_string(),
        })?;
        let (out_shape, data) =
            value
                .try_extract_tensor::<f32>()
                .map_err(|e| AnalysisError::Model {
                    message: format!("Failed to extract hidden states: {e}"),
                })?;

        if out_shape.len() != 3 {
            return Err(AnalysisError::Model {
                message: format!("Unexpected hidden state shape: {out_shape:?}"),
            });
        }
        let hidden = out_shape[2] as usize;

        let embeddings = (0..batch_size)
            .map(|i| {
                let token_states = &data[i * seq_len * hidden..(i + 1) * seq_len * hidden];
                let mask = &attention_mask[i * seq_len..(i + 1) * seq_len];
                mean_pool(token_states, mask, hidden)
            })
            .collect();

        Ok(embeddings)
    }

    /// Embed a single text.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, AnalysisError> {
        let batch = self.embed_batch(&[text.to_string()])?;
        batch.into_iter().next().ok_or_else(|| AnalysisError::Model {
            message: "Embedder returned empty result for single input".to_string(),
        })
    }

    /// Check whether the embedding model files exist.
    pub fn model_exists(model_dir: &Path, model_name: &str) -> bool {
        let dir = model_dir.join(model_name);
        dir.join("model.onnx").exists() && dir.join("tokenizer.json").exists()
    }
}

/// Mask-weighted mean over token hidden states, L2-normalized.
fn mean_pool(token_states: &[f32], mask: &[i64], hidden: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden];
    let mut count = 0.0f32;
    for (j, &m) in mask.iter().enumerate() {
        if m == 0 {
            continue;
        }
        count += 1.0;
        let row = &token_states[j * hidden..(j + 1) * hidden];
        for (p, &v) in pooled.iter_mut().zip(row) {
            *p += v;
        }
    }
    if count > 0.0 {
        for p in pooled.iter_mut() {
            *p /= count;
        }
    }
    crate::math::l2_normalize_in_place(&mut pooled);
    pooled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_pool_averages_unmasked_tokens_only() {
        // Two tokens of hidden size 2; second token masked out.
        let states = [1.0, 3.0, 100.0, 100.0];
        let pooled = mean_pool(&states, &[1, 0], 2);
        // Mean is (1.0, 3.0), normalized to unit length.
        let norm = (1.0f32 + 9.0).sqrt();
        assert!((pooled[0] - 1.0 / norm).abs() < 1e-6);
        assert!((pooled[1] - 3.0 / norm).abs() < 1e-6);
    }

    #[test]
    fn test_mean_pool_is_unit_length() {
        let states = [0.3, -0.7, 1.2, 0.1, -0.4, 0.9];
        let pooled = mean_pool(&states, &[1, 1, 1], 2);
        let norm: f32 = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_mean_pool_all_masked_is_zero_vector() {
        let states = [1.0, 2.0];
        let pooled = mean_pool(&states, &[0], 2);
        assert_eq!(pooled, vec![0.0, 0.0]);
    }

    #[test]
    fn test_model_exists_false_for_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!TextEmbedder::model_exists(dir.path(), "minilm"));
    }
}
