//! Core domain types for the book catalog.
//!
//! Books are keyed by ISBN. Ratings reference books through the same ISBN
//! space, so no cross-referencing happens downstream of the provider.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Opaque book identifier (an ISBN in the Book-Crossing data)
pub type BookId = String;

/// Lowest explicit rating value. A zero in the raw data means "implicit".
pub const MIN_RATING: u8 = 1;

/// Highest explicit rating value
pub const MAX_RATING: u8 = 10;

// =============================================================================
// Book-related Types
// =============================================================================

/// A single catalog entry.
///
/// Identity is `id`; two records with the same title but different ids are
/// different books (e.g. separate editions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub publisher: String,
    /// Publication year, 0 when unknown
    pub year: u16,
}

impl BookRecord {
    pub fn new(
        id: impl Into<BookId>,
        title: impl Into<String>,
        author: impl Into<String>,
        publisher: impl Into<String>,
        year: u16,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            publisher: publisher.into(),
            year,
        }
    }
}

// =============================================================================
// Rating Types
// =============================================================================

/// One explicit rating of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub book_id: BookId,
    /// Rating value in `MIN_RATING..=MAX_RATING`
    pub value: u8,
}

impl RatingRecord {
    pub fn new(book_id: impl Into<BookId>, value: u8) -> Self {
        Self {
            book_id: book_id.into(),
            value,
        }
    }
}

/// Per-book rating statistics, derived on every request and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateRating {
    pub mean_rating: f32,
    /// Always >= 1: books without ratings have no aggregate at all
    pub rating_count: u32,
}

// =============================================================================
// CatalogSnapshot
// =============================================================================

/// A consistent view of books and ratings for the duration of one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub books: Vec<BookRecord>,
    pub ratings: Vec<RatingRecord>,
}

impl CatalogSnapshot {
    pub fn new(books: Vec<BookRecord>, ratings: Vec<RatingRecord>) -> Self {
        Self { books, ratings }
    }

    /// First catalog entry with the given id.
    pub fn get_book(&self, id: &str) -> Option<&BookRecord> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn contains_book(&self, id: &str) -> bool {
        self.get_book(id).is_some()
    }

    /// Number of ratings per book id. Books without ratings are absent.
    pub fn rating_counts(&self) -> HashMap<&str, u32> {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for rating in &self.ratings {
            *counts.entry(rating.book_id.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Get counts for debugging/validation
    pub fn counts(&self) -> (usize, usize) {
        (self.books.len(), self.ratings.len())
    }
}
