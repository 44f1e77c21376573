//! TF-IDF vectorization of feature strings.
//!
//! ## Weighting
//! - tf: raw term count in the document
//! - idf: `ln((1 + n) / (1 + df)) + 1` (smoothed, so a term present in every
//!   document still keeps weight 1)
//! - rows are L2-normalized
//!
//! ## Terms
//! Tokens are runs of two or more word characters (`[a-z0-9_]`). Stop words are
//! removed before n-grams are formed, so bigrams join the surviving neighbours.
//! The vocabulary is sorted, which keeps column order independent of input
//! order and hashing.

use crate::similarity::SparseVector;
use crate::stop_words::is_stop_word;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Fitted TF-IDF model plus the transformed documents.
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    /// Terms in column order
    pub vocabulary: Vec<String>,
    /// Inverse document frequency per column
    pub idf: Vec<f32>,
    /// One normalized row per input document
    pub rows: Vec<SparseVector>,
}

impl TfidfMatrix {
    pub fn n_documents(&self) -> usize {
        self.rows.len()
    }

    pub fn n_terms(&self) -> usize {
        self.vocabulary.len()
    }

    /// Column of a term, if it survived fitting.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
    }
}

/// Term-weighting vectorizer over unigrams and bigrams.
#[derive(Debug, Clone, Copy)]
pub struct TfidfVectorizer {
    ngram_range: (usize, usize),
    min_df: usize,
    stop_words: bool,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self {
            ngram_range: (1, 2),
            min_df: 1,
            stop_words: true,
        }
    }

    /// Configure the n-gram range, inclusive (default: (1, 2))
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.ngram_range = (min_n.max(1), max_n.max(min_n.max(1)));
        self
    }

    /// Configure the minimum document frequency (default: 1)
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df.max(1);
        self
    }

    /// Enable or disable English stop-word removal (default: enabled)
    pub fn with_stop_words(mut self, enabled: bool) -> Self {
        self.stop_words = enabled;
        self
    }

    /// Split a document into terms (unigrams and n-grams).
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let tokens: Vec<&str> = document
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|t| t.chars().count() >= 2)
            .filter(|t| !(self.stop_words && is_stop_word(t)))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Learn vocabulary and idf from `documents` and transform them.
    pub fn fit_transform(&self, documents: &[String]) -> TfidfMatrix {
        let term_counts: Vec<HashMap<String, u32>> = documents
            .par_iter()
            .map(|doc| {
                let mut counts: HashMap<String, u32> = HashMap::new();
                for term in self.analyze(doc) {
                    *counts.entry(term).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for counts in &term_counts {
            for term in counts.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let vocabulary: Vec<String> = document_frequency
            .iter()
            .filter(|&(_, &df)| df >= self.min_df)
            .map(|(term, _)| term.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let column: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.as_str(), idx))
            .collect();

        let n = documents.len() as f32;
        let idf: Vec<f32> = vocabulary
            .iter()
            .map(|term| {
                let df = document_frequency[term.as_str()] as f32;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows: Vec<SparseVector> = term_counts
            .par_iter()
            .map(|counts| {
                let entries = counts
                    .iter()
                    .filter_map(|(term, &count)| {
                        column
                            .get(term.as_str())
                            .map(|&idx| (idx, count as f32 * idf[idx]))
                    })
                    .collect();
                SparseVector::new(entries).normalized()
            })
            .collect();

        debug!(
            "TF-IDF fitted: {} documents, {} terms",
            rows.len(),
            vocabulary.len()
        );

        TfidfMatrix {
            vocabulary,
            idf,
            rows,
        }
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}
