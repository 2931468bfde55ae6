//! Free-text caption generation for cargo images.
//!
//! Runs a BLIP-style encoder/decoder exported to ONNX: the vision encoder
//! produces hidden states, and the text decoder is run greedily one token
//! at a time (re-running the full prefix each step; sequences are short
//! enough that KV caching isn't worth the model-format complexity).

use std::path::Path;
use std::sync::Mutex;

use image::DynamicImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::config::CaptionConfig;
use crate::error::AnalysisError;

/// Vision encoder ONNX filename.
const ENCODER_FILENAME: &str = "vision_model.onnx";
/// Text decoder ONNX filename.
const DECODER_FILENAME: &str = "text_decoder.onnx";
/// Tokenizer filename.
const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// BLIP preprocessing normalization mean (R, G, B).
const NORM_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
/// BLIP preprocessing normalization std (R, G, B).
const NORM_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];
/// BLIP input resolution.
const IMAGE_SIZE: u32 = 384;

/// Caption generator over a BLIP encoder/decoder pair.
pub struct Captioner {
    encoder: Mutex<Session>,
    decoder: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
    /// Decoder start token ([DEC] for BLIP, falling back to [CLS]).
    bos_id: u32,
    /// End-of-sequence token ([SEP]).
    eos_id: u32,
    max_length: usize,
}

impl Captioner {
    /// Load the captioner from `{model_dir}/{caption_model}/`.
    pub fn load(config: &CaptionConfig, model_dir: &Path) -> Result<Self, AnalysisError> {
        let dir = model_dir.join(&config.model);
        let encoder_path = dir.join(ENCODER_FILENAME);
        let decoder_path = dir.join(DECODER_FILENAME);
        let tokenizer_path = dir.join(TOKENIZER_FILENAME);

        for path in [&encoder_path, &decoder_path, &tokenizer_path] {
            if !path.exists() {
                return Err(AnalysisError::Model {
                    message: format!(
                        "Caption model file not found at {path:?}. Run `cargolens models download` first."
                    ),
                });
            }
        }

        let encoder = Self::open_session(&encoder_path)?;
        let decoder = Self::open_session(&decoder_path)?;

        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            AnalysisError::Model {
                message: format!("Failed to load caption tokenizer: {e}"),
            }
        })?;

        let bos_id = tokenizer
            .token_to_id("[DEC]")
            .or_else(|| tokenizer.token_to_id("[CLS]"))
            .ok_or_else(|| AnalysisError::Model {
                message: "Caption tokenizer has no decoder start token".to_string(),
            })?;
        let eos_id = tokenizer
            .token_to_id("[SEP]")
            .ok_or_else(|| AnalysisError::Model {
                message: "Caption tokenizer has no [SEP] token".to_string(),
            })?;

        tracing::info!("Caption model loaded from {:?}", dir);

        Ok(Self {
            encoder: Mutex::new(encoder),
            decoder: Mutex::new(decoder),
            tokenizer,
            bos_id,
            eos_id,
            max_length: config.max_length,
        })
    }

    fn open_session(path: &Path) -> Result<Session, AnalysisError> {
        Session::builder()
            .map_err(|e| AnalysisError::Model {
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(path)
            .map_err(|e| AnalysisError::Model {
                message: format!("Failed to load caption model from {path:?}: {e}"),
            })
    }

    /// Generate a caption for an image.
    ///
    /// Errors here are degradable: the analyzer maps them to an empty caption.
    pub fn caption(&self, image: &DynamicImage) -> Result<String, AnalysisError> {
        let (hidden_shape, hidden_states) = self.encode_image(image)?;
        let token_ids = self.decode_greedy(&hidden_shape, &hidden_states)?;

        let text = self
            .tokenizer
            .decode(&token_ids, true)
            .map_err(|e| AnalysisError::Caption {
                message: format!("Failed to decode caption tokens: {e}"),
            })?;

        Ok(text.trim().to_string())
    }

    /// Run the vision encoder, returning (shape, flat hidden states).
    fn encode_image(&self, image: &DynamicImage) -> Result<(Vec<i64>, Vec<f32>), AnalysisError> {
        let tensor = preprocess_blip(image);
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let flat: Vec<f32> = tensor.iter().copied().collect();

        let input_value =
            Value::from_array((shape, flat)).map_err(|e| AnalysisError::Caption {
                message: format!("Failed to create encoder input tensor: {e}"),
            })?;

        let mut encoder = self.encoder.lock().map_err(|e| AnalysisError::Caption {
            message: format!("Encoder lock poisoned: {e}"),
        })?;

        let outputs = encoder
            .run(ort::inputs!["pixel_values" => input_value])
            .map_err(|e| AnalysisError::Caption {
                message: format!("Caption encoder inference failed: {e}"),
            })?;

        // First output is last_hidden_state [1, seq, hidden].
        let (_, value) = outputs.iter().next().ok_or_else(|| AnalysisError::Caption {
            message: "Caption encoder produced no outputs".to_string(),
        })?;
        let (shape, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| AnalysisError::Caption {
                message: format!("Failed to extract encoder hidden states: {e}"),
            })?;

        Ok((shape.to_vec(), data.to_vec()))
    }

    /// Greedy decoding loop: re-run the decoder on the growing prefix and
    /// append the argmax token until [SEP] or max_length.
    fn decode_greedy(
        &self,
        hidden_shape: &[i64],
        hidden_states: &[f32],
    ) -> Result<Vec<u32>, AnalysisError> {
        let mut tokens: Vec<u32> = vec![self.bos_id];
        let encoder_seq_len = if hidden_shape.len() >= 2 {
            hidden_shape[1]
        } else {
            return Err(AnalysisError::Caption {
                message: format!("Unexpected encoder output shape: {hidden_shape:?}"),
            });
        };

        let mut decoder = self.decoder.lock().map_err(|e| AnalysisError::Caption {
            message: format!("Decoder lock poisoned: {e}"),
        })?;

        while tokens.len() < self.max_length {
            let seq_len = tokens.len();
            let input_ids: Vec<i64> = tokens.iter().map(|&t| t as i64).collect();
            let attention: Vec<i64> = vec![1; seq_len];
            let encoder_attention: Vec<i64> = vec![1; encoder_seq_len as usize];

            let ids_value = Value::from_array((vec![1i64, seq_len as i64], input_ids)).map_err(
                |e| AnalysisError::Caption {
                    message: format!("Failed to create input_ids tensor: {e}"),
                },
            )?;
            let mask_value = Value::from_array((vec![1i64, seq_len as i64], attention)).map_err(
                |e| AnalysisError::Caption {
                    message: format!("Failed to create attention_mask tensor: {e}"),
                },
            )?;
            let hidden_value =
                Value::from_array((hidden_shape.to_vec(), hidden_states.to_vec())).map_err(
                    |e| AnalysisError::Caption {
                        message: format!("Failed to create encoder_hidden_states tensor: {e}"),
                    },
                )?;
            let enc_mask_value =
                Value::from_array((vec![1i64, encoder_seq_len], encoder_attention)).map_err(
                    |e| AnalysisError::Caption {
                        message: format!("Failed to create encoder_attention_mask tensor: {e}"),
                    },
                )?;

            let outputs = decoder
                .run(ort::inputs![
                    "input_ids" => ids_value,
                    "attention_mask" => mask_value,
                    "encoder_hidden_states" => hidden_value,
                    "encoder_attention_mask" => enc_mask_value,
                ])
                .map_err(|e| AnalysisError::Caption {
                    message: format!("Caption decoder inference failed: {e}"),
                })?;

            let (_, logits_value) =
                outputs.iter().next().ok_or_else(|| AnalysisError::Caption {
                    message: "Caption decoder produced no outputs".to_string(),
                })?;
            let (logits_shape, logits) = logits_value.try_extract_tensor::<f32>().map_err(|e| {
                AnalysisError::Caption {
                    message: format!("Failed to extract decoder logits: {e}"),
                }
            })?;

            // Logits are [1, seq, vocab]; pick the argmax of the last step.
            let vocab_size = *logits_shape.last().ok_or_else(|| AnalysisError::Caption {
                message: "Decoder logits have no vocab dimension".to_string(),
            })? as usize;
            let next = next_token(logits, vocab_size).ok_or_else(|| AnalysisError::Caption {
                message: "Decoder logits were empty".to_string(),
            })?;

            if next == self.eos_id {
                break;
            }
            tokens.push(next);
        }

        // Drop the start token before detokenizing.
        Ok(tokens[1..].to_vec())
    }

    /// Check whether the caption model files exist.
    pub fn model_exists(config: &CaptionConfig, model_dir: &Path) -> bool {
        let dir = model_dir.join(&config.model);
        dir.join(ENCODER_FILENAME).exists()
            && dir.join(DECODER_FILENAME).exists()
            && dir.join(TOKENIZER_FILENAME).exists()
    }
}

/// Argmax over the last timestep of a flat [1, seq, vocab] logits buffer.
fn next_token(logits: &[f32], vocab_size: usize) -> Option<u32> {
    if vocab_size == 0 || logits.len() < vocab_size {
        return None;
    }
    let last = &logits[logits.len() - vocab_size..];
    let (idx, _) = last
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
    Some(idx as u32)
}

/// Preprocess an image for the BLIP vision encoder.
///
/// BLIP resizes directly to 384×384 (no center crop) and normalizes with
/// its own per-channel constants.
fn preprocess_blip(image: &DynamicImage) -> Array4<f32> {
    let resized = image.resize_exact(IMAGE_SIZE, IMAGE_SIZE, image::imageops::FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let size = IMAGE_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    let raw = rgb.as_raw();
    let tensor_data = tensor.as_slice_mut().unwrap();
    for (i, pixel) in raw.chunks_exact(3).enumerate() {
        let y = i / size;
        let x = i % size;
        for (c, &val) in pixel.iter().enumerate() {
            let idx = c * size * size + y * size + x;
            tensor_data[idx] = (val as f32 / 255.0 - NORM_MEAN[c]) / NORM_STD[c];
        }
    }
    tensor
}
