//! Catalog providers.
//!
//! The recommendation engine never reaches into storage itself; it is handed a
//! `CatalogProvider` and asks it for a snapshot once per request. Providers own
//! their own lifecycle (connections, caches, files) independently of the engine.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// File name of the books table inside a Book-Crossing directory
pub const BOOKS_FILE: &str = "Books.csv";

/// File name of the ratings table inside a Book-Crossing directory
pub const RATINGS_FILE: &str = "Book-Ratings.csv";

/// Source of book and rating records, already resolved to one id space.
///
/// `Send + Sync` so a single provider can serve concurrent requests.
pub trait CatalogProvider: Send + Sync {
    /// All books, in catalog order.
    fn fetch_catalog(&self) -> Result<Vec<BookRecord>>;

    /// All explicit ratings.
    fn fetch_ratings(&self) -> Result<Vec<RatingRecord>>;

    /// Books and ratings together as one request-scoped snapshot.
    fn snapshot(&self) -> Result<CatalogSnapshot> {
        let books = self.fetch_catalog()?;
        let ratings = self.fetch_ratings()?;
        Ok(CatalogSnapshot::new(books, ratings))
    }
}

/// A provider backed by records held in memory.
///
/// Every fetch hands out a fresh copy, so callers can never observe each
/// other's derived state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    books: Vec<BookRecord>,
    ratings: Vec<RatingRecord>,
}

impl InMemoryCatalog {
    pub fn new(books: Vec<BookRecord>, ratings: Vec<RatingRecord>) -> Self {
        Self { books, ratings }
    }

    /// Load the Book-Crossing dataset from a directory.
    ///
    /// Steps:
    /// 1. Parse Books.csv and Book-Ratings.csv in parallel
    /// 2. Report skipped lines
    /// 3. Validate rating values
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading Book-Crossing dataset from {:?}", data_dir);

        let books_path = data_dir.join(BOOKS_FILE);
        let ratings_path = data_dir.join(RATINGS_FILE);

        let (books, ratings) = rayon::join(
            || parser::parse_books(&books_path),
            || parser::parse_ratings(&ratings_path),
        );
        let books = books?;
        let ratings = ratings?;

        if books.skipped > 0 {
            warn!("Skipped {} malformed lines in {}", books.skipped, BOOKS_FILE);
        }
        if ratings.skipped > 0 {
            warn!(
                "Skipped {} malformed lines in {}",
                ratings.skipped, RATINGS_FILE
            );
        }

        let catalog = Self::new(books.records, ratings.records);
        catalog.validate()?;

        let (book_count, rating_count) = catalog.counts();
        info!("Loaded {} books, {} explicit ratings", book_count, rating_count);
        Ok(catalog)
    }

    /// Check that every rating lies in the explicit range.
    pub fn validate(&self) -> Result<()> {
        for rating in &self.ratings {
            if !(MIN_RATING..=MAX_RATING).contains(&rating.value) {
                return Err(CatalogError::InvalidValue {
                    field: "rating".to_string(),
                    value: rating.value.to_string(),
                });
            }
        }
        debug!("Validated {} ratings", self.ratings.len());
        Ok(())
    }

    pub fn insert_book(&mut self, book: BookRecord) {
        self.books.push(book);
    }

    pub fn insert_rating(&mut self, rating: RatingRecord) {
        self.ratings.push(rating);
    }

    /// Borrow the books without copying them.
    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn ratings(&self) -> &[RatingRecord] {
        &self.ratings
    }

    /// Get counts for debugging/validation
    pub fn counts(&self) -> (usize, usize) {
        (self.books.len(), self.ratings.len())
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn fetch_catalog(&self) -> Result<Vec<BookRecord>> {
        Ok(self.books.clone())
    }

    fn fetch_ratings(&self) -> Result<Vec<RatingRecord>> {
        Ok(self.ratings.clone())
    }
}
