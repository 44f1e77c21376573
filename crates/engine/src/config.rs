//! Tunables shared by the popularity and similarity paths.

use serde::{Deserialize, Serialize};

/// Default minimum rating count for the similarity candidate subset.
pub const DEFAULT_POPULARITY_THRESHOLD: u32 = 20;

/// Default length of the popularity ranking.
pub const DEFAULT_TOP_N: usize = 5;

/// Default number of similar titles returned.
pub const DEFAULT_MAX_SIMILAR: usize = 5;

/// Engine configuration.
///
/// ```ignore
/// let config = EngineConfig::default()
///     .with_popularity_threshold(50)
///     .with_max_similar(10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Books with fewer ratings are left out of the similarity subset
    pub popularity_threshold: u32,
    /// Number of titles in the popularity ranking
    pub top_n: usize,
    /// Number of distinct titles returned by content similarity
    pub max_similar: usize,
}

impl EngineConfig {
    /// Configure the popularity threshold (default: 20)
    pub fn with_popularity_threshold(mut self, threshold: u32) -> Self {
        self.popularity_threshold = threshold;
        self
    }

    /// Configure the popularity ranking length (default: 5)
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Configure the number of similar titles (default: 5)
    pub fn with_max_similar(mut self, max_similar: usize) -> Self {
        self.max_similar = max_similar;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            popularity_threshold: DEFAULT_POPULARITY_THRESHOLD,
            top_n: DEFAULT_TOP_N,
            max_similar: DEFAULT_MAX_SIMILAR,
        }
    }
}
