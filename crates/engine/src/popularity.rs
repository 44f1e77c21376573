//! Popularity Ranker
//!
//! Ranks books by how many explicit ratings they received.
//!
//! ## Algorithm
//! 1. Group ratings by book id, computing (mean, count)
//! 2. Sort by count DESC, breaking ties by book id ASC
//! 3. Keep the top N aggregates
//! 4. Inner-join against the catalog to get titles; ids the catalog no longer
//!    knows are dropped, so the result can be shorter than N

use catalog::{AggregateRating, BookId, BookRecord, RatingRecord};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::config::DEFAULT_TOP_N;

/// Aggregate all ratings per book id.
///
/// Every returned `rating_count` equals the number of records carrying that id.
pub fn aggregate_ratings(ratings: &[RatingRecord]) -> HashMap<BookId, AggregateRating> {
    let sums: HashMap<&str, (u64, u32)> = ratings
        .par_iter()
        .fold(HashMap::new, |mut local: HashMap<&str, (u64, u32)>, rating| {
            let entry = local.entry(rating.book_id.as_str()).or_insert((0, 0));
            entry.0 += u64::from(rating.value);
            entry.1 += 1;
            local
        })
        .reduce(HashMap::new, |mut acc, local| {
            for (book_id, (sum, count)) in local {
                let entry = acc.entry(book_id).or_insert((0, 0));
                entry.0 += sum;
                entry.1 += count;
            }
            acc
        });

    sums.into_iter()
        .map(|(book_id, (sum, count))| {
            (
                book_id.to_string(),
                AggregateRating {
                    mean_rating: sum as f32 / count as f32,
                    rating_count: count,
                },
            )
        })
        .collect()
}

/// Ranks the catalog by rating count.
#[derive(Debug, Clone, Copy)]
pub struct PopularityRanker {
    top_n: usize,
}

impl PopularityRanker {
    pub fn new() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Configure the ranking length (default: 5)
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Top book ids with their aggregates, most-rated first.
    pub fn top_aggregates(&self, ratings: &[RatingRecord]) -> Vec<(BookId, AggregateRating)> {
        let mut ranked: Vec<(BookId, AggregateRating)> =
            aggregate_ratings(ratings).into_iter().collect();

        ranked.sort_unstable_by(|a, b| {
            b.1.rating_count
                .cmp(&a.1.rating_count)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(self.top_n);
        ranked
    }

    /// Titles of the most-rated books.
    ///
    /// Returns an empty Vec when there are no ratings.
    #[instrument(skip_all, fields(books = books.len(), ratings = ratings.len()))]
    pub fn rank(&self, books: &[BookRecord], ratings: &[RatingRecord]) -> Vec<String> {
        let top = self.top_aggregates(ratings);
        debug!("Top rated ids: {:?}", top.iter().map(|(id, _)| id).collect::<Vec<_>>());

        let mut by_id: HashMap<&str, &BookRecord> = HashMap::with_capacity(books.len());
        for book in books {
            by_id.entry(book.id.as_str()).or_insert(book);
        }

        let titles: Vec<String> = top
            .iter()
            .filter_map(|(book_id, _)| by_id.get(book_id.as_str()).map(|b| b.title.clone()))
            .collect();

        if titles.len() < top.len() {
            debug!(
                "{} top-rated ids are missing from the catalog",
                top.len() - titles.len()
            );
        }
        titles
    }
}

impl Default for PopularityRanker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(id: &str, values: &[u8]) -> Vec<RatingRecord> {
        values.iter().map(|&v| RatingRecord::new(id, v)).collect()
    }

    fn books(ids: &[(&str, &str)]) -> Vec<BookRecord> {
        ids.iter()
            .map(|(id, title)| BookRecord::new(*id, *title, "Author", "Publisher", 2000))
            .collect()
    }

    #[test]
    fn test_aggregate_counts_and_means() {
        let ratings = [rated("a", &[10, 8, 6]), rated("b", &[5])].concat();
        let aggregates = aggregate_ratings(&ratings);

        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates["a"].rating_count, 3);
        assert!((aggregates["a"].mean_rating - 8.0).abs() < 1e-6);
        assert_eq!(aggregates["b"].rating_count, 1);
        assert!((aggregates["b"].mean_rating - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_rank_by_count_descending() {
        let books = books(&[("a", "Alpha"), ("b", "Beta"), ("c", "Gamma")]);
        let ratings = [rated("a", &[5]), rated("b", &[5, 6, 7]), rated("c", &[1, 2])].concat();

        let titles = PopularityRanker::new().rank(&books, &ratings);
        assert_eq!(titles, vec!["Beta", "Gamma", "Alpha"]);
    }

    #[test]
    fn test_ties_broken_by_book_id() {
        let books = books(&[("z", "Zed"), ("m", "Em"), ("a", "Ay")]);
        let ratings = [rated("z", &[5, 5]), rated("m", &[5, 5]), rated("a", &[5, 5])].concat();

        let titles = PopularityRanker::new().rank(&books, &ratings);
        assert_eq!(titles, vec!["Ay", "Em", "Zed"]);
    }

    #[test]
    fn test_missing_catalog_entries_are_dropped() {
        let books = books(&[("a", "Alpha")]);
        let ratings = [rated("gone", &[5, 5, 5]), rated("a", &[5])].concat();

        let titles = PopularityRanker::new().rank(&books, &ratings);
        assert_eq!(titles, vec!["Alpha"]);
    }

    #[test]
    fn test_top_n_applied_before_join() {
        let books = books(&[("a", "Alpha"), ("b", "Beta")]);
        let ratings = [rated("gone", &[5, 5, 5]), rated("a", &[5, 5]), rated("b", &[5])].concat();

        let titles = PopularityRanker::new().with_top_n(2).rank(&books, &ratings);
        assert_eq!(titles, vec!["Alpha"]);
    }

    #[test]
    fn test_no_ratings_is_empty() {
        let books = books(&[("a", "Alpha")]);
        let titles = PopularityRanker::new().rank(&books, &[]);
        assert!(titles.is_empty());
    }

    #[test]
    fn test_truncates_to_top_n() {
        let books = books(&[
            ("1", "One"),
            ("2", "Two"),
            ("3", "Three"),
            ("4", "Four"),
            ("5", "Five"),
            ("6", "Six"),
        ]);
        let ratings = [
            rated("1", &[5; 6]),
            rated("2", &[5; 5]),
            rated("3", &[5; 4]),
            rated("4", &[5; 3]),
            rated("5", &[5; 2]),
            rated("6", &[5; 1]),
        ]
        .concat();

        let titles = PopularityRanker::new().rank(&books, &ratings);
        assert_eq!(titles, vec!["One", "Two", "Three", "Four", "Five"]);
    }
}
