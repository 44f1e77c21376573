//! Text features for content similarity.
//!
//! Each book is reduced to one normalized string built from title, author and
//! publisher. Identical (title, author, publisher) triples always produce
//! identical strings, and the similarity index relies on that equality to find
//! a book's row.

use catalog::BookRecord;
use rayon::prelude::*;

/// Build the feature string for one book.
///
/// ## Algorithm
/// 1. Join title, author, publisher with single spaces
/// 2. Lowercase
/// 3. Drop non-ASCII characters (no transliteration)
/// 4. Drop everything that is not alphanumeric, `_` or whitespace
/// 5. Trim leading and trailing whitespace
///
/// A record whose fields are entirely non-ASCII reduces to an empty string.
pub fn feature_text(book: &BookRecord) -> String {
    let combined = format!("{} {} {}", book.title, book.author, book.publisher);
    combined
        .to_lowercase()
        .chars()
        .filter(char::is_ascii)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_ascii_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Compute feature strings for many books in parallel.
///
/// Output order matches input order.
pub fn compute_features(books: &[&BookRecord]) -> Vec<String> {
    books.par_iter().map(|book| feature_text(book)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str, publisher: &str) -> BookRecord {
        BookRecord::new("id", title, author, publisher, 2000)
    }

    #[test]
    fn test_feature_text_normalizes() {
        let text = feature_text(&book("Dune: Messiah!", "Frank Herbert", "Ace Books"));
        assert_eq!(text, "dune messiah frank herbert ace books");
    }

    #[test]
    fn test_feature_text_drops_non_ascii() {
        let text = feature_text(&book("Café Noël", "José", "Éditions"));
        assert_eq!(text, "caf nol jos ditions");
    }

    #[test]
    fn test_feature_text_lowercases_before_dropping_non_ascii() {
        // KELVIN SIGN lowercases to 'k'; dotted capital I lowercases to 'i' + U+0307
        let text = feature_text(&book("\u{212A}ing", "\u{0130}stanbul", "Pub"));
        assert_eq!(text, "king istanbul pub");
    }

    #[test]
    fn test_feature_text_can_be_empty() {
        let text = feature_text(&book("東京", "村上", "講談社"));
        assert_eq!(text, "");
    }

    #[test]
    fn test_feature_text_keeps_inner_whitespace() {
        let text = feature_text(&book("  A -- B  ", "C", "D"));
        assert_eq!(text, "a  b   c d");
    }

    #[test]
    fn test_identical_triples_share_features() {
        let a = BookRecord::new("1", "Emma", "Jane Austen", "Penguin", 1990);
        let b = BookRecord::new("2", "Emma", "Jane Austen", "Penguin", 2003);
        assert_eq!(feature_text(&a), feature_text(&b));
    }

    #[test]
    fn test_compute_features_preserves_order() {
        let a = book("First", "A", "P");
        let b = book("Second", "B", "Q");
        let features = compute_features(&[&a, &b]);
        assert_eq!(features, vec!["first a p", "second b q"]);
    }
}
