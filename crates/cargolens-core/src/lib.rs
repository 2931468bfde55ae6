//! CargoLens Core - Embeddable cargo-image tagging and query-analysis library.
//!
//! CargoLens analyzes cargo-marketplace content locally: it tags cargo
//! photos against a fixed category set, captions them, and interprets
//! Arabic search queries into structured filters.
//!
//! # Architecture
//!
//! ```text
//! Image → Decode → Embed (CLIP) → Category tags + Caption (BLIP) → JSON
//! Query → Lexicon scan → {city, country, timeFilter, isJobSearch} → JSON
//! Query + Docs → Sentence embeddings → Cosine ranking → JSON
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use cargolens_core::{search, Config, ImageAnalyzer};
//!
//! #[tokio::main]
//! async fn main() -> cargolens_core::Result<()> {
//!     let config = Config::load()?;
//!     let analyzer = ImageAnalyzer::load(&config)?;
//!     let result = analyzer.analyze("./cargo.jpg".as_ref()).await?;
//!     println!("Tags: {:?}", result.clip_tags);
//!
//!     let lexicon = search::Lexicon::default();
//!     let query = search::interpret("وظيفة سائق في الرياض", &lexicon);
//!     println!("City: {:?}", query.city);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod analyzer;
pub mod caption;
pub mod config;
pub mod error;
pub mod math;
pub mod output;
pub mod search;
pub mod tagging;
pub mod types;
pub mod vision;

// Re-exports for convenient access
pub use analyzer::ImageAnalyzer;
pub use config::Config;
pub use error::{AnalysisError, AnalysisResult, CargoLensError, ConfigError, Result};
pub use output::{OutputFormat, OutputWriter};
pub use types::{ErrorPayload, ImageAnalysis, QueryAnalysis, RankedMatch};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
