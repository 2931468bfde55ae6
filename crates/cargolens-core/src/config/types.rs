//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where models are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.cargolens/models"),
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
        }
    }
}

/// CLIP dual-encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Model directory name under `model_dir` ("clip-vit-base-patch32")
    pub model: String,

    /// Image input size (224 for the base patch32 variant)
    pub image_size: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model: "clip-vit-base-patch32".to_string(),
            image_size: 224,
        }
    }
}

/// Category tagging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingConfig {
    /// Number of top categories to report
    pub max_tags: usize,

    /// CLIP's learned logit scale: softmax over `scale * cosine`.
    /// 100.0 matches exp(4.6052), the released clip-vit-base-patch32 value.
    pub logit_scale: f32,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            max_tags: 3,
            logit_scale: 100.0,
        }
    }
}

/// Caption generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Whether caption generation is enabled
    pub enabled: bool,

    /// Model directory name under `model_dir`
    pub model: String,

    /// Maximum generated sequence length in tokens
    pub max_length: usize,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "blip-image-captioning-base".to_string(),
            max_length: 50,
        }
    }
}

/// Search settings: sentence-embedding model and lexicon override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Sentence-embedding model directory name under `model_dir`
    pub embedding_model: String,

    /// Default number of ranked results
    pub top_k: usize,

    /// Optional TOML file overriding the built-in keyword lexicon
    pub lexicon_file: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            embedding_model: "paraphrase-multilingual-minilm-l12-v2".to_string(),
            top_k: 10,
            lexicon_file: None,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
