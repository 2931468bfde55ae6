//! The closed set of candidate cargo categories.
//!
//! These are the labels scored against every image. The set is small and
//! fixed: zero-shot classification over a closed vocabulary, not open-ended
//! tagging.

/// Candidate cargo categories, in scoring order.
pub const CARGO_CATEGORIES: &[&str] = &[
    "cardboard boxes",
    "sand pile",
    "steel bars",
    "furniture",
    "food items",
    "transport equipment",
    "trailer truck",
    "cement bags",
    "shipping container",
    "general cargo",
];
