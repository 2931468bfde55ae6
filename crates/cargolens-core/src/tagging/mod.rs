//! Zero-shot cargo-category classification.
//!
//! Scores an image embedding against the fixed category set by computing
//! dot products with pre-encoded label embeddings, scaling by CLIP's learned
//! logit scale, and taking a softmax over the closed label set.

pub mod categories;
pub mod text_encoder;

use std::path::Path;

use crate::config::TaggingConfig;
use crate::error::AnalysisError;
use crate::math::softmax_in_place;

pub use categories::CARGO_CATEGORIES;
pub use text_encoder::ClipTextEncoder;

/// Classifies image embeddings into cargo categories.
///
/// Label embeddings are encoded once at construction; classification itself
/// is a pure dot-product/softmax over them.
pub struct CategoryClassifier {
    labels: Vec<String>,
    label_embeddings: Vec<Vec<f32>>,
    config: TaggingConfig,
}

impl CategoryClassifier {
    /// Build a classifier by encoding the fixed category set.
    ///
    /// Loads the text encoder from `{model_dir}/{vision_model}/` — CLIP's
    /// text tower lives alongside the vision tower it was trained with.
    pub fn load(
        model_dir: &Path,
        vision_model: &str,
        config: TaggingConfig,
    ) -> Result<Self, AnalysisError> {
        let encoder = ClipTextEncoder::load(&model_dir.join(vision_model))?;
        let labels: Vec<String> = CARGO_CATEGORIES.iter().map(|s| s.to_string()).collect();

        tracing::debug!("Encoding {} category labels", labels.len());
        let label_embeddings = encoder.encode_batch(&labels)?;

        Ok(Self {
            labels,
            label_embeddings,
            config,
        })
    }

    /// Build a classifier from already-computed label embeddings.
    pub fn from_embeddings(
        labels: Vec<String>,
        label_embeddings: Vec<Vec<f32>>,
        config: TaggingConfig,
    ) -> Self {
        Self {
            labels,
            label_embeddings,
            config,
        }
    }

    /// Classify an image embedding against the category set.
    ///
    /// Returns up to `max_tags` (label, probability) pairs sorted by
    /// probability descending. Probabilities come from a softmax over the
    /// whole closed set, so they sum to 1 before truncation.
    pub fn classify(&self, image_embedding: &[f32]) -> Vec<(String, f32)> {
        let mut logits: Vec<f32> = self
            .label_embeddings
            .iter()
            .map(|label_emb| {
                // Both sides are L2-normalized: dot product = cosine.
                let cosine: f32 = image_embedding
                    .iter()
                    .zip(label_emb)
                    .map(|(a, b)| a * b)
                    .sum();
                self.config.logit_scale * cosine
            })
            .collect();

        softmax_in_place(&mut logits);

        let mut scored: Vec<(usize, f32)> = logits.into_iter().enumerate().collect();
        // Descending by probability, ties broken by label order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.config.max_tags.min(self.labels.len()));

        scored
            .into_iter()
            .map(|(idx, prob)| (self.labels[idx].clone(), prob))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier_with(embeddings: Vec<Vec<f32>>, max_tags: usize) -> CategoryClassifier {
        let labels = embeddings
            .iter()
            .enumerate()
            .map(|(i, _)| format!("label-{i}"))
            .collect();
        CategoryClassifier::from_embeddings(
            labels,
            embeddings,
            TaggingConfig {
                max_tags,
                logit_scale: 100.0,
            },
        )
    }

    #[test]
    fn test_classify_ranks_most_similar_first() {
        // Orthogonal label embeddings; the image aligns with the second.
        let classifier = classifier_with(
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
            3,
        );
        let tags = classifier.classify(&[0.1, 0.9, 0.1]);

        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].0, "label-1");
        assert!(tags[0].1 > tags[1].1);
        assert!(tags[1].1 >= tags[2].1);
    }

    #[test]
    fn test_classify_probabilities_sum_to_one_before_truncation() {
        let classifier = classifier_with(vec![vec![1.0, 0.0], vec![0.0, 1.0]], 2);
        let tags = classifier.classify(&[0.6, 0.8]);
        let sum: f32 = tags.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_classify_truncates_to_max_tags() {
        let classifier = classifier_with(
            vec![
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![0.7, 0.7],
                vec![-1.0, 0.0],
            ],
            3,
        );
        let tags = classifier.classify(&[1.0, 0.0]);
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn test_classify_handles_fewer_labels_than_max_tags() {
        let classifier = classifier_with(vec![vec![1.0, 0.0]], 3);
        let tags = classifier.classify(&[1.0, 0.0]);
        assert_eq!(tags.len(), 1);
        assert!((tags[0].1 - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_cargo_category_count_matches_fixed_set() {
        assert_eq!(CARGO_CATEGORIES.len(), 10);
    }
}
