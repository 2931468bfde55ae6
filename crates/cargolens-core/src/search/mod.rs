//! Search-query interpretation and semantic ranking.
//!
//! Two independent pieces: a pure keyword interpreter over a fixed Arabic
//! lexicon, and an embedding-based similarity ranker. The interpreter needs
//! no model; the ranker loads a multilingual sentence-transformer.

pub mod embedder;
pub mod interpreter;
pub mod lexicon;
pub mod ranker;

pub use embedder::TextEmbedder;
pub use interpreter::interpret;
pub use lexicon::{Lexicon, TimeKeyword};
pub use ranker::{rank_by_similarity, SemanticRanker};
