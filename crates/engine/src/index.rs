//! Similarity Index - content-based recommendations with a fallback cascade
//!
//! ## Algorithm
//! 1. Count ratings per book (0 when absent)
//! 2. Keep books with count >= threshold ("popular subset"); if the target is
//!    not among them, widen to the full catalog (fallback stage 1)
//! 3. Require the target's feature string in the subset
//! 4. TF-IDF vectorize the subset's feature strings
//! 5. Cosine similarity over the subset
//! 6. Locate the target row by feature string (first match wins)
//! 7. Walk rows by similarity DESC, skipping the target's title and titles
//!    already taken, until K titles are collected
//! 8. Nothing collected: return the popularity ranking (fallback stage 2),
//!    filtered by the same title rules as step 7

use catalog::{BookRecord, CatalogSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::error::{RecommendError, Result};
use crate::features::{compute_features, feature_text};
use crate::popularity::PopularityRanker;
use crate::similarity::SimilarityMatrix;
use crate::vectorizer::TfidfVectorizer;

/// Which stage of the cascade produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Similarity over books meeting the popularity threshold
    PopularSubset,
    /// Similarity over the whole catalog (target was below the threshold)
    FullCatalog,
    /// Similarity found nothing; popularity ranking returned instead
    PopularityFallback,
}

/// Result of a content-based request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarTitles {
    pub titles: Vec<String>,
    pub strategy: Strategy,
}

/// Books considered as similarity candidates, in catalog order.
#[derive(Debug, Clone)]
pub struct CandidateSubset<'a> {
    pub books: Vec<&'a BookRecord>,
    /// True when the subset had to be widened to the whole catalog
    pub widened: bool,
}

/// Select the popular subset for a target, widening when the target misses it.
pub fn popular_subset<'a>(
    books: &'a [BookRecord],
    rating_counts: &HashMap<&str, u32>,
    threshold: u32,
    target_id: &str,
) -> CandidateSubset<'a> {
    let popular: Vec<&BookRecord> = books
        .iter()
        .filter(|book| rating_counts.get(book.id.as_str()).copied().unwrap_or(0) >= threshold)
        .collect();

    if popular.iter().any(|book| book.id == target_id) {
        CandidateSubset {
            books: popular,
            widened: false,
        }
    } else {
        CandidateSubset {
            books: books.iter().collect(),
            widened: true,
        }
    }
}

/// Rank subset rows against `target_row` and collect distinct titles.
///
/// Ordering is similarity DESC, then position ASC. The target's own title is
/// never returned, even when it belongs to a different id.
pub fn select_similar_titles(
    subset: &[&BookRecord],
    similarities: &[f32],
    target_title: &str,
    limit: usize,
) -> Vec<String> {
    let mut order: Vec<usize> = (0..similarities.len()).collect();
    order.sort_by(|&a, &b| {
        similarities[b]
            .total_cmp(&similarities[a])
            .then_with(|| a.cmp(&b))
    });

    distinct_titles(
        order.into_iter().map(|idx| subset[idx].title.as_str()),
        target_title,
        limit,
    )
}

/// Take up to `limit` titles in the order given, skipping `target_title` and
/// any title already taken.
pub fn distinct_titles<'a>(
    candidates: impl IntoIterator<Item = &'a str>,
    target_title: &str,
    limit: usize,
) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut titles = Vec::with_capacity(limit);
    for title in candidates {
        if titles.len() >= limit {
            break;
        }
        if title == target_title || !seen.insert(title) {
            continue;
        }
        titles.push(title.to_string());
    }
    titles
}

/// Content-similarity recommender.
///
/// Holds configuration only; every call rebuilds features, vectors and the
/// similarity matrix from the snapshot it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityIndex {
    config: EngineConfig,
}

impl SimilarityIndex {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recommend up to `max_similar` titles similar to `book_id`.
    #[instrument(skip(self, snapshot), fields(threshold = self.config.popularity_threshold))]
    pub fn recommend(&self, snapshot: &CatalogSnapshot, book_id: &str) -> Result<SimilarTitles> {
        let target = snapshot
            .get_book(book_id)
            .ok_or_else(|| RecommendError::BookNotFound {
                book_id: book_id.to_string(),
            })?;

        let rating_counts = snapshot.rating_counts();
        let subset = popular_subset(
            &snapshot.books,
            &rating_counts,
            self.config.popularity_threshold,
            book_id,
        );
        if subset.widened {
            warn!(
                "Book {} ({}) not in popular subset, widening to full catalog",
                book_id, target.title
            );
        }
        debug!("Candidate subset size: {}", subset.books.len());

        let target_features = feature_text(target);
        let features = compute_features(&subset.books);
        let feature_set: HashSet<&str> = features.iter().map(String::as_str).collect();
        if target_features.is_empty() || !feature_set.contains(target_features.as_str()) {
            warn!(
                "Book features for {} ({:?}) not in candidate subset",
                target.title, target_features
            );
            return Err(RecommendError::FeaturesNotFound {
                book_id: book_id.to_string(),
                title: target.title.clone(),
            });
        }

        let tfidf = TfidfVectorizer::new().fit_transform(&features);
        let matrix = SimilarityMatrix::new(tfidf.rows);

        let target_row = features
            .iter()
            .position(|f| *f == target_features)
            .ok_or_else(|| RecommendError::Internal {
                title: target.title.clone(),
            })?;

        let similarities = matrix.row(target_row);
        let titles = select_similar_titles(
            &subset.books,
            &similarities,
            &target.title,
            self.config.max_similar,
        );

        if titles.is_empty() {
            warn!("No similar books found, returning popular books as fallback");
            // Rank everything so filtering cannot shrink the list below top_n
            let ranked = PopularityRanker::new()
                .with_top_n(usize::MAX)
                .rank(&snapshot.books, &snapshot.ratings);
            let titles = distinct_titles(
                ranked.iter().map(String::as_str),
                &target.title,
                self.config.top_n,
            );
            return Ok(SimilarTitles {
                titles,
                strategy: Strategy::PopularityFallback,
            });
        }

        let strategy = if subset.widened {
            Strategy::FullCatalog
        } else {
            Strategy::PopularSubset
        };
        info!("Recommended {} books for {}", titles.len(), target.title);
        Ok(SimilarTitles { titles, strategy })
    }
}
