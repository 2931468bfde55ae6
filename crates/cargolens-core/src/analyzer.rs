//! End-to-end image analysis: decode, embed, classify, caption.
//!
//! Models are loaded once at construction and exclusively owned by the
//! analyzer; analyzing an image is then a linear pass through the stages.
//! Load failures are fatal. Inference failures (embedding, classification,
//! captioning) are isolated: the failing stage degrades to an empty result,
//! the rest of the payload is still produced.

use std::path::Path;

use crate::caption::Captioner;
use crate::config::Config;
use crate::error::AnalysisError;
use crate::tagging::CategoryClassifier;
use crate::types::ImageAnalysis;
use crate::vision::{ImageDecoder, VisionEngine};

/// Owns the full image-analysis stack.
pub struct ImageAnalyzer {
    decoder: ImageDecoder,
    engine: VisionEngine,
    classifier: CategoryClassifier,
    captioner: Option<Captioner>,
}

impl ImageAnalyzer {
    /// Load all models per the configuration.
    ///
    /// Any missing or unloadable model is a fatal error here, before any
    /// image is touched.
    pub fn load(config: &Config) -> Result<Self, AnalysisError> {
        let model_dir = config.model_dir();

        let engine = VisionEngine::load(&config.vision, &model_dir)?;
        let classifier =
            CategoryClassifier::load(&model_dir, &config.vision.model, config.tagging.clone())?;
        let captioner = if config.caption.enabled {
            Some(Captioner::load(&config.caption, &model_dir)?)
        } else {
            None
        };

        Ok(Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            engine,
            classifier,
            captioner,
        })
    }

    /// Analyze one image file.
    ///
    /// Decode errors propagate; embedding, classification, and caption
    /// errors degrade to an empty tag list / empty caption. An embedding
    /// failure empties the tag stage (there is nothing to classify) while
    /// captioning still runs on the decoded image.
    pub async fn analyze(&self, path: &Path) -> Result<ImageAnalysis, AnalysisError> {
        let decoded = self.decoder.decode(path).await?;
        tracing::debug!(
            "Decoded {:?}: {}x{} {:?}",
            path,
            decoded.width,
            decoded.height,
            decoded.format
        );

        let tags = match self.engine.embed(&decoded.image) {
            Ok(embedding) => match self.classify_embedding(&embedding) {
                Ok(tags) => tags,
                Err(e) => {
                    debug_assert!(!e.is_fatal());
                    tracing::warn!("Classification degraded to empty result: {e}");
                    vec![]
                }
            },
            Err(e) => {
                debug_assert!(!e.is_fatal());
                tracing::warn!("Image embedding degraded to empty tags: {e}");
                vec![]
            }
        };

        let description = match &self.captioner {
            Some(captioner) => match captioner.caption(&decoded.image) {
                Ok(text) => text,
                Err(e) => {
                    debug_assert!(!e.is_fatal());
                    tracing::warn!("Captioning degraded to empty result: {e}");
                    String::new()
                }
            },
            None => String::new(),
        };

        Ok(ImageAnalysis::new(tags, description))
    }

    fn classify_embedding(&self, embedding: &[f32]) -> Result<Vec<(String, f32)>, AnalysisError> {
        if embedding.is_empty() {
            return Err(AnalysisError::Classify {
                message: "Empty image embedding".to_string(),
            });
        }
        Ok(self.classifier.classify(embedding))
    }
}
