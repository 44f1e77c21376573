//! # Engine Crate
//!
//! The recommendation computation: turns catalog and rating records into a
//! popularity ranking or a content-similarity ranking.
//!
//! ## Components
//!
//! ### Feature Builder (`features`)
//! Normalized text per book from title, author and publisher.
//!
//! ### Popularity Ranker (`popularity`)
//! Aggregates ratings per book and ranks by rating count.
//!
//! ### Similarity Index (`index`)
//! Filters the catalog to popular books, vectorizes features with TF-IDF
//! (`vectorizer`), computes cosine similarity (`similarity`) and walks the
//! fallback cascade:
//! - target below the popularity threshold: widen to the full catalog
//! - no similar titles: return the popularity ranking
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{EngineConfig, PopularityRanker, SimilarityIndex};
//!
//! let snapshot = provider.snapshot()?;
//!
//! let popular = PopularityRanker::new().rank(&snapshot.books, &snapshot.ratings);
//! let similar = SimilarityIndex::new(EngineConfig::default())
//!     .recommend(&snapshot, "0441172717")?;
//! ```
//!
//! Nothing is cached between calls: every request recomputes from the
//! snapshot it is given, so concurrent requests share no state.

pub mod config;
pub mod error;
pub mod features;
pub mod index;
pub mod popularity;
pub mod similarity;
pub mod stop_words;
pub mod vectorizer;

// Re-export main types
pub use config::EngineConfig;
pub use error::{ErrorKind, RecommendError, Result};
pub use features::{compute_features, feature_text};
pub use index::{SimilarTitles, SimilarityIndex, Strategy};
pub use popularity::{aggregate_ratings, PopularityRanker};
pub use similarity::{cosine_similarity, SimilarityMatrix, SparseVector};
pub use vectorizer::{TfidfMatrix, TfidfVectorizer};
