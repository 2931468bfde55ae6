//! Core data types for CargoLens.
//!
//! These types are the JSON payloads the CLI emits: the image-analysis
//! result, the query-interpretation result, and ranked similarity matches.
//! All are constructed fresh per call and never mutated after return.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The complete output of analyzing one cargo image.
///
/// Field names match the consumer's expected wire format (the backend that
/// shells out to the tool), hence the `clip_`/`blip_` prefixes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAnalysis {
    /// Category labels, highest confidence first
    pub clip_tags: Vec<String>,

    /// Label → confidence mapping (softmax probabilities)
    pub clip_scores: BTreeMap<String, f32>,

    /// Free-text caption; empty string when the caption stage failed
    pub blip_description: String,

    /// Always "success" on the success payload
    pub status: String,
}

impl ImageAnalysis {
    /// Build a success payload from ranked (label, confidence) pairs and a caption.
    pub fn new(tags: Vec<(String, f32)>, description: String) -> Self {
        let clip_tags = tags.iter().map(|(label, _)| label.clone()).collect();
        let clip_scores = tags.into_iter().collect();
        Self {
            clip_tags,
            clip_scores,
            blip_description: description,
            status: "success".to_string(),
        }
    }
}

/// Structured interpretation of a free-text Arabic search query.
///
/// Serialized in camelCase for the consuming backend. Optional fields are
/// emitted as explicit `null` when absent, not omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnalysis {
    /// The raw query text as received
    pub search_text: String,

    /// First matched city, in lexicon declaration order
    pub city: Option<String>,

    /// First matched country, independent of the city match
    pub country: Option<String>,

    /// Day-count window from the first matched time keyword
    pub time_filter: Option<u32>,

    /// True when any job keyword occurs in the query
    pub is_job_search: bool,

    /// Query text with the matched city/country/time substrings removed
    /// and whitespace collapsed
    pub cleaned_text: String,
}

/// One ranked candidate from a semantic similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMatch {
    /// Position of this candidate in the original input sequence
    pub index: usize,

    /// Cosine similarity against the query embedding
    pub score: f32,

    /// The candidate text itself
    pub text: String,
}

/// Structured error payload, emitted on stderr for any unrecoverable failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_analysis_preserves_rank_order() {
        let analysis = ImageAnalysis::new(
            vec![
                ("steel bars".to_string(), 0.7),
                ("general cargo".to_string(), 0.2),
                ("sand pile".to_string(), 0.1),
            ],
            "a truck loaded with steel".to_string(),
        );

        assert_eq!(
            analysis.clip_tags,
            vec!["steel bars", "general cargo", "sand pile"]
        );
        assert_eq!(analysis.clip_scores["steel bars"], 0.7);
        assert_eq!(analysis.status, "success");
    }

    #[test]
    fn test_image_analysis_json_shape() {
        let analysis = ImageAnalysis::new(
            vec![("furniture".to_string(), 0.9)],
            "boxes on a pallet".to_string(),
        );
        let json = serde_json::to_value(&analysis).unwrap();

        assert!(json["clip_tags"].is_array());
        assert!(json["clip_scores"].is_object());
        assert_eq!(json["blip_description"], "boxes on a pallet");
        assert_eq!(json["status"], "success");
    }

    #[test]
    fn test_query_analysis_camel_case_with_nulls() {
        let analysis = QueryAnalysis {
            search_text: "شاحنة نقل".to_string(),
            city: None,
            country: None,
            time_filter: None,
            is_job_search: false,
            cleaned_text: "شاحنة نقل".to_string(),
        };
        let json = serde_json::to_string(&analysis).unwrap();

        // camelCase keys, and absent optionals serialized as explicit null
        assert!(json.contains("\"searchText\""));
        assert!(json.contains("\"city\":null"));
        assert!(json.contains("\"country\":null"));
        assert!(json.contains("\"timeFilter\":null"));
        assert!(json.contains("\"isJobSearch\":false"));
        assert!(json.contains("\"cleanedText\""));
    }

    #[test]
    fn test_query_analysis_roundtrip() {
        let analysis = QueryAnalysis {
            search_text: "وظيفة في الرياض".to_string(),
            city: Some("الرياض".to_string()),
            country: None,
            time_filter: Some(7),
            is_job_search: true,
            cleaned_text: "وظيفة في".to_string(),
        };
        let json = serde_json::to_string(&analysis).unwrap();
        let parsed: QueryAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, analysis);
    }

    #[test]
    fn test_error_payload_shape() {
        let payload = ErrorPayload::new("No query provided");
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, "{\"error\":\"No query provided\"}");
    }
}
