//! CLIP image embedding generation.
//!
//! Converts cargo photos into 512-dimensional vector embeddings using a
//! CLIP vision encoder running locally via ONNX Runtime. The embedding
//! lives in the same space as [`crate::tagging::ClipTextEncoder`] output,
//! which is what makes zero-shot category scoring work.

pub mod decode;
pub(crate) mod preprocess;
pub(crate) mod clip;

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::config::VisionConfig;
use crate::error::AnalysisError;

use self::clip::ClipVisualSession;
use self::preprocess::preprocess;

pub use decode::{DecodedImage, ImageDecoder};

/// The vision encoder ONNX model filename.
const VISUAL_MODEL_FILENAME: &str = "visual.onnx";

/// Engine for generating image embeddings via CLIP.
#[derive(Debug)]
pub struct VisionEngine {
    session: ClipVisualSession,
    image_size: u32,
}

impl VisionEngine {
    /// Load the CLIP vision encoder from the model directory.
    ///
    /// Expects the ONNX model at `{model_dir}/{model_name}/visual.onnx`.
    pub fn load(config: &VisionConfig, model_dir: &Path) -> Result<Self, AnalysisError> {
        let model_path = Self::model_path(config, model_dir);

        if !model_path.exists() {
            return Err(AnalysisError::Model {
                message: format!(
                    "Vision model not found at {model_path:?}. Run `cargolens models download` first."
                ),
            });
        }

        tracing::info!("Loading CLIP vision model from {:?}", model_path);
        let session = ClipVisualSession::load(&model_path)?;
        tracing::info!("CLIP vision model loaded");

        Ok(Self {
            session,
            image_size: config.image_size,
        })
    }

    /// Generate an embedding vector for an image.
    ///
    /// Returns an L2-normalized Vec<f32> (512 dimensions for base patch32).
    pub fn embed(&self, image: &DynamicImage) -> Result<Vec<f32>, AnalysisError> {
        let tensor = preprocess(image, self.image_size);
        self.session.embed(&tensor)
    }

    /// Check whether the model file exists on disk.
    pub fn model_exists(config: &VisionConfig, model_dir: &Path) -> bool {
        Self::model_path(config, model_dir).exists()
    }

    /// Get the expected model file path.
    pub fn model_path(config: &VisionConfig, model_dir: &Path) -> PathBuf {
        model_dir.join(&config.model).join(VISUAL_MODEL_FILENAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisionConfig;

    #[test]
    fn test_model_path_layout() {
        let config = VisionConfig::default();
        let path = VisionEngine::model_path(&config, Path::new("/models"));
        assert_eq!(
            path,
            Path::new("/models/clip-vit-base-patch32/visual.onnx")
        );
    }

    #[test]
    fn test_load_without_model_is_fatal_model_error() {
        let config = VisionConfig::default();
        let dir = tempfile::tempdir().unwrap();
        let err = VisionEngine::load(&config, dir.path()).unwrap_err();
        assert!(matches!(err, AnalysisError::Model { .. }));
        assert!(err.is_fatal());
    }
}
