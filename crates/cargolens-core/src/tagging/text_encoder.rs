//! CLIP text encoder for embedding category labels.
//!
//! Loads the CLIP text ONNX model and tokenizer, encodes label strings to
//! 512-dimensional vectors aligned with the vision encoder's space.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;

use crate::error::AnalysisError;

/// CLIP's fixed text sequence length.
const MAX_LENGTH: usize = 77;

/// CLIP text encoder wrapper.
///
/// Uses the same `Mutex<Session>` pattern as the vision encoder.
pub struct ClipTextEncoder {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
    embedding_dim: usize,
}

impl ClipTextEncoder {
    /// Load the text encoder from the model directory.
    ///
    /// Expects `text_model.onnx` and `tokenizer.json` in `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self, AnalysisError> {
        let text_model_path = model_dir.join("text_model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !text_model_path.exists() {
            return Err(AnalysisError::Model {
                message: format!(
                    "Text encoder not found at {:?}. Run `cargolens models download` first.",
                    text_model_path
                ),
            });
        }

        if !tokenizer_path.exists() {
            return Err(AnalysisError::Model {
                message: format!(
                    "Tokenizer not found at {:?}. Run `cargolens models download` first.",
                    tokenizer_path
                ),
            });
        }

        let session = Session::builder()
            .map_err(|e| AnalysisError::Model {
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(&text_model_path)
            .map_err(|e| AnalysisError::Model {
                message: format!("Failed to load text encoder model: {e}"),
            })?;

        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            AnalysisError::Model {
                message: format!("Failed to load tokenizer: {e}"),
            }
        })?;

        tracing::debug!(
            "Loaded CLIP text encoder (inputs: {:?}, outputs: {:?})",
            session
                .inputs()
                .iter()
                .map(|i| i.name())
                .collect::<Vec<_>>(),
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            embedding_dim: 512,
        })
    }

    /// Encode a batch of label strings to normalized embeddings.
    ///
    /// Returns a Vec of 512-dim f32 vectors, one per input text.
    pub fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalysisError> {
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

        // CLIP text model takes input_ids and attention_mask, padded to 77.
        let mut input_ids = vec![0i64; batch_size * MAX_LENGTH];
        let mut attention_mask = vec![0i64; batch_size * MAX_LENGTH];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            for (j, &id) in ids.iter().take(MAX_LENGTH).enumerate() {
                input_ids[i * MAX_LENGTH + j] = id as i64;
                attention_mask[i * MAX_LENGTH + j] = 1;
            }
        }

        let batch_shape = vec![batch_size as i64, MAX_LENGTH as i64];
        let ids_value = Value::from_array((batch_shape.clone(), input_ids)).map_err(|e| {
            AnalysisError::Model {
                message: format!("Failed to create input_ids tensor: {e}"),
            }
        })?;
        let mask_value =
            Value::from_array((batch_shape, attention_mask)).map_err(|e| AnalysisError::Model {
                message: format!("Failed to create attention_mask tensor: {e}"),
            })?;

        let mut session = self.session.lock().map_err(|e| AnalysisError::Model {
            message: format!("Text encoder lock poisoned: {e}"),
        })?;

        let outputs = session
            .run(ort::inputs!["input_ids" => ids_value, "attention_mask" => mask_value])
            .map_err(|e| AnalysisError::Model {
                message: format!("Text encoder inference failed: {e}"),
            })?;

        // Extract text_embeds by name — the projected cross-modal embedding.
        let text_embeds = outputs
            .iter()
            .find(|(name, _)| *name == "text_embeds")
            .ok_or_else(|| AnalysisError::Model {
                message: "Text encoder did not produce text_embeds".to_string(),
            })?;

        let (_shape, data) =
            text_embeds
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| AnalysisError::Model {
                    message: format!("Failed to extract text_embeds: {e}"),
                })?;

        // Split flat output into per-text embeddings and L2-normalize.
        let embeddings: Vec<Vec<f32>> = data
            .chunks(self.embedding_dim)
            .take(batch_size)
            .map(crate::math::l2_normalize)
            .collect();

        Ok(embeddings)
    }

    /// Check whether the text encoder model files exist.
    pub fn model_exists(model_dir: &Path) -> bool {
        model_dir.join("text_model.onnx").exists() && model_dir.join("tokenizer.json").exists()
    }
}
