//! Errors raised by the recommendation engine.
//!
//! Empty results are not errors: a catalog with no ratings produces an empty
//! popularity ranking, and that is a normal outcome.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification used at the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The requested resource does not exist (or has no usable signal)
    NotFound,
    /// An invariant was violated inside the service
    Internal,
}

impl ErrorKind {
    /// HTTP status the transport layer should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendError {
    /// The requested id is not in the catalog
    #[error("Book with ISBN {book_id} not found")]
    BookNotFound { book_id: String },

    /// The book exists but has no usable text features
    #[error("Book {title} not found in processed dataset")]
    FeaturesNotFound { book_id: String, title: String },

    /// A feature string located earlier could not be located again
    #[error("Internal error: could not process book features for {title}")]
    Internal { title: String },
}

impl RecommendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecommendError::BookNotFound { .. } | RecommendError::FeaturesNotFound { .. } => {
                ErrorKind::NotFound
            }
            RecommendError::Internal { .. } => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;
