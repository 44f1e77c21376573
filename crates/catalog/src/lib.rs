//! # Catalog Crate
//!
//! This crate supplies the book and rating records the recommendation engine
//! consumes.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (BookRecord, RatingRecord, CatalogSnapshot)
//! - **parser**: Parse Book-Crossing CSV files into Rust structs
//! - **provider**: The `CatalogProvider` seam and an in-memory implementation
//! - **error**: Error types for catalog access
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogProvider, InMemoryCatalog};
//! use std::path::Path;
//!
//! let catalog = InMemoryCatalog::load_from_dir(Path::new("data/book-crossing"))?;
//! let snapshot = catalog.snapshot()?;
//!
//! println!("{} books, {} ratings", snapshot.books.len(), snapshot.ratings.len());
//! ```

// Public modules
pub mod error;
pub mod parser;
pub mod provider;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use provider::{CatalogProvider, InMemoryCatalog};
pub use types::{
    AggregateRating, BookId, BookRecord, CatalogSnapshot, RatingRecord, MAX_RATING, MIN_RATING,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CatalogSnapshot::default();
        assert_eq!(snapshot.counts(), (0, 0));
        assert!(snapshot.get_book("anything").is_none());
        assert!(snapshot.rating_counts().is_empty());
    }

    #[test]
    fn test_get_book_returns_first_duplicate() {
        let snapshot = CatalogSnapshot::new(
            vec![
                BookRecord::new("1", "First", "A", "P", 2000),
                BookRecord::new("1", "Second", "A", "P", 2001),
            ],
            vec![],
        );
        assert_eq!(snapshot.get_book("1").unwrap().title, "First");
    }

    #[test]
    fn test_rating_counts_match_records() {
        let snapshot = CatalogSnapshot::new(
            vec![],
            vec![
                RatingRecord::new("a", 5),
                RatingRecord::new("b", 7),
                RatingRecord::new("a", 9),
            ],
        );
        let counts = snapshot.rating_counts();
        assert_eq!(counts["a"], 2);
        assert_eq!(counts["b"], 1);
    }

    #[test]
    fn test_book_record_serializes() {
        let book = BookRecord::new("0441172717", "Dune", "Frank Herbert", "Ace Books", 1990);
        let json = serde_json::to_string(&book).unwrap();
        assert!(json.contains("\"title\":\"Dune\""));

        let back: BookRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);
    }
}
