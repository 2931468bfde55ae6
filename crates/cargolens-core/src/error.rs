//! Error types for CargoLens.
//!
//! Analysis errors are organized by stage so callers can tell fatal failures
//! (bad argument, missing file, model failed to load) apart from per-stage
//! inference failures, which degrade to an empty result for that stage only.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for CargoLens operations.
#[derive(Error, Debug)]
pub enum CargoLensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image/text analysis errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Analysis errors, organized by stage.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// Model file missing or failed to load (fatal)
    #[error("Model error: {message}")]
    Model { message: String },

    /// Image embedding inference failed (degradable)
    #[error("Embedding failed: {message}")]
    Embedding { message: String },

    /// Category classification inference failed (degradable)
    #[error("Classification failed: {message}")]
    Classify { message: String },

    /// Caption generation failed (degradable)
    #[error("Captioning failed: {message}")]
    Caption { message: String },
}

impl AnalysisError {
    /// Whether this error aborts the whole run.
    ///
    /// Inference failures (embedding, classification, captioning) are
    /// isolated to their stage: the analyzer substitutes an empty result
    /// and continues. Everything else (missing input, decode failure,
    /// model load failure) is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Embedding { .. } | Self::Classify { .. } | Self::Caption { .. }
        )
    }
}

/// Convenience type alias for CargoLens results.
pub type Result<T> = std::result::Result<T, CargoLensError>;

/// Convenience type alias for analysis-stage results.
pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
