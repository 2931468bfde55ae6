//! Semantic similarity ranking of candidate documents against a query.
//!
//! The embedding step is delegated to [`TextEmbedder`]; the ranking itself
//! is a pure function over the resulting vectors so it can be tested
//! without a model on disk.

use crate::error::AnalysisError;
use crate::math::cosine_similarity;
use crate::types::RankedMatch;

use super::embedder::TextEmbedder;

/// Rank documents by cosine similarity against a query embedding.
///
/// Returns up to `k` (index, score) pairs, sorted by descending score.
/// Ties are broken by ascending original index, which makes the ordering
/// fully deterministic.
pub fn rank_by_similarity(
    query_embedding: &[f32],
    doc_embeddings: &[Vec<f32>],
    k: usize,
) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = doc_embeddings
        .iter()
        .enumerate()
        .map(|(i, doc)| (i, cosine_similarity(query_embedding, doc)))
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(k.min(doc_embeddings.len()));
    scored
}

/// Semantic search over candidate document strings.
pub struct SemanticRanker {
    embedder: TextEmbedder,
}

impl SemanticRanker {
    /// Wrap a loaded embedder.
    pub fn new(embedder: TextEmbedder) -> Self {
        Self { embedder }
    }

    /// Return the top-`k` documents most similar to `query`.
    ///
    /// An empty candidate list yields an empty result, not an error.
    pub fn rank(
        &self,
        query: &str,
        documents: &[String],
        k: usize,
    ) -> Result<Vec<RankedMatch>, AnalysisError> {
        if documents.is_empty() {
            return Ok(vec![]);
        }

        let query_embedding = self.embedder.embed(query)?;
        let doc_embeddings = self.embedder.embed_batch(documents)?;

        let ranked = rank_by_similarity(&query_embedding, &doc_embeddings, k);
        Ok(ranked
            .into_iter()
            .map(|(index, score)| RankedMatch {
                index,
                score,
                text: documents[index].clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_returns_k_results_sorted_descending() {
        let query = vec![1.0, 0.0];
        let docs = vec![
            vec![0.0, 1.0],  // orthogonal
            vec![1.0, 0.0],  // identical
            vec![0.7, 0.7],  // in between
        ];
        let ranked = rank_by_similarity(&query, &docs, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, 1);
        assert_eq!(ranked[1].0, 2);
        assert!(ranked[0].1 >= ranked[1].1);
    }

    #[test]
    fn test_rank_indices_are_valid_original_positions() {
        let query = vec![1.0, 0.0];
        let docs = vec![vec![0.5, 0.5], vec![0.9, 0.1], vec![0.1, 0.9]];
        let ranked = rank_by_similarity(&query, &docs, 3);
        for (idx, _) in &ranked {
            assert!(*idx < docs.len());
        }
    }

    #[test]
    fn test_rank_ties_broken_by_original_index() {
        let query = vec![1.0, 0.0];
        // Documents 0 and 1 have identical similarity to the query.
        let docs = vec![vec![0.6, 0.8], vec![0.6, 0.8], vec![1.0, 0.0]];
        let ranked = rank_by_similarity(&query, &docs, 3);

        assert_eq!(ranked[0].0, 2);
        assert_eq!(ranked[1].0, 0);
        assert_eq!(ranked[2].0, 1);
    }

    #[test]
    fn test_rank_k_larger_than_candidate_set() {
        let query = vec![1.0];
        let docs = vec![vec![1.0], vec![-1.0]];
        let ranked = rank_by_similarity(&query, &docs, 10);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_rank_empty_candidates_is_empty_not_error() {
        let ranked = rank_by_similarity(&[1.0, 0.0], &[], 5);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_rank_k_zero() {
        let ranked = rank_by_similarity(&[1.0], &[vec![1.0]], 0);
        assert!(ranked.is_empty());
    }
}
