//! Parser for Book-Crossing data files.
//!
//! Both files are semicolon-delimited with double-quoted fields and a header:
//! - Books.csv: ISBN;Book-Title;Book-Author;Year-Of-Publication;Publisher;Image-URL-S;...
//! - Book-Ratings.csv: User-ID;ISBN;Book-Rating
//!
//! Malformed lines are skipped rather than failing the whole load; callers get
//! the number of skipped lines back so they can report it.

use crate::error::{CatalogError, Result};
use crate::types::*;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Placeholder for a missing author or publisher.
pub const UNKNOWN_FIELD: &str = "Other";

/// Earliest publication year accepted as real data.
pub const MIN_YEAR: u16 = 1800;

/// Latest publication year accepted as real data.
pub const MAX_YEAR: u16 = 2025;

/// Records parsed from one file plus the count of lines that were dropped.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// Read a file with ISO-8859-1 encoding (Latin-1).
///
/// Every byte maps directly to the Unicode code point of the same value, so
/// the conversion cannot fail.
fn read_latin1(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Book-Crossing dialect: `;` delimiter, double quotes, `\"` or `""` for a
/// literal quote, and rows that may carry extra or missing columns.
fn book_crossing_records(text: &str) -> csv::StringRecordsIntoIter<&[u8]> {
    ReaderBuilder::new()
        .delimiter(b';')
        .escape(Some(b'\\'))
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes())
        .into_records()
}

/// Normalise a raw publication year.
///
/// Quotes are stripped; anything that is not all digits or falls outside
/// `MIN_YEAR..=MAX_YEAR` becomes 0.
pub fn clean_year(raw: &str) -> u16 {
    let year: String = raw
        .trim()
        .chars()
        .filter(|&c| c != '"' && c != '\'')
        .collect();
    if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
        return 0;
    }
    match year.parse::<u16>() {
        Ok(y) if (MIN_YEAR..=MAX_YEAR).contains(&y) => y,
        _ => 0,
    }
}

fn or_unknown(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        UNKNOWN_FIELD.to_string()
    } else {
        value.to_string()
    }
}

fn is_header(record: &StringRecord, first_column: &str) -> bool {
    record
        .get(0)
        .is_some_and(|f| f.trim().eq_ignore_ascii_case(first_column))
}

fn line_of(record: &StringRecord, fallback: usize) -> usize {
    record.position().map_or(fallback, |p| p.line() as usize)
}

/// Parse the contents of Books.csv.
pub fn parse_books_from_str(text: &str) -> Parsed<BookRecord> {
    let mut records = Vec::new();
    let mut skipped = 0;

    for (idx, result) in book_crossing_records(text).enumerate() {
        let Ok(record) = result else {
            skipped += 1;
            continue;
        };
        if idx == 0 && is_header(&record, "ISBN") {
            continue;
        }
        if record.len() < 5 {
            skipped += 1;
            continue;
        }

        let id = record[0].trim();
        if id.is_empty() {
            skipped += 1;
            continue;
        }

        records.push(BookRecord {
            id: id.to_string(),
            title: record[1].trim().to_string(),
            author: or_unknown(&record[2]),
            year: clean_year(&record[3]),
            publisher: or_unknown(&record[4]),
        });
    }

    Parsed { records, skipped }
}

/// Parse the contents of Book-Ratings.csv.
///
/// Implicit ratings (value 0) are dropped. A numeric value outside
/// `0..=MAX_RATING` is a data error rather than a malformed line.
pub fn parse_ratings_from_str(text: &str) -> Result<Parsed<RatingRecord>> {
    let mut records = Vec::new();
    let mut skipped = 0;

    for (idx, result) in book_crossing_records(text).enumerate() {
        let Ok(record) = result else {
            skipped += 1;
            continue;
        };
        if idx == 0 && is_header(&record, "User-ID") {
            continue;
        }
        if record.len() < 3 {
            skipped += 1;
            continue;
        }

        let book_id = record[1].trim();
        let raw = record[2].trim();
        let Ok(value) = raw.parse::<i64>() else {
            skipped += 1;
            continue;
        };
        if book_id.is_empty() {
            skipped += 1;
            continue;
        }
        if value == 0 {
            continue;
        }
        let value = match u8::try_from(value) {
            Ok(v) if v <= MAX_RATING => v,
            _ => {
                return Err(CatalogError::InvalidValue {
                    field: format!("rating (line {})", line_of(&record, idx + 1)),
                    value: raw.to_string(),
                });
            }
        };

        records.push(RatingRecord {
            book_id: book_id.to_string(),
            value,
        });
    }

    Ok(Parsed { records, skipped })
}

/// Parse the Books.csv file
pub fn parse_books(path: &Path) -> Result<Parsed<BookRecord>> {
    let text = read_latin1(path)?;
    Ok(parse_books_from_str(&text))
}

/// Parse the Book-Ratings.csv file
pub fn parse_ratings(path: &Path) -> Result<Parsed<RatingRecord>> {
    let text = read_latin1(path)?;
    parse_ratings_from_str(&text)
}
