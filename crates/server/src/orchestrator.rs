//! # Recommendation Orchestrator
//!
//! The contract the transport layer calls. Two entry points:
//! - `get_popular`: popularity ranking, never an error for empty data
//! - `get_content_based`: validate the id, then run the similarity cascade
//!
//! Each call:
//! 1. Fetches a fresh snapshot from the catalog provider
//! 2. Runs the engine on a blocking thread (it is CPU-bound)
//! 3. Drops every derived structure before returning
//!
//! Nothing is retried here; retry policy belongs to the provider.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, instrument, warn};

use catalog::{CatalogError, CatalogProvider, CatalogSnapshot};
use engine::{
    EngineConfig, ErrorKind, PopularityRanker, RecommendError, SimilarTitles, SimilarityIndex,
};

/// Errors surfaced to the transport layer.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Engine outcome (not found, internal invariant failure), passed through unchanged
    #[error(transparent)]
    Recommend(#[from] RecommendError),

    /// The provider could not deliver a snapshot
    #[error("Error fetching data: {0}")]
    Catalog(#[from] CatalogError),

    /// The blocking computation panicked or was cancelled
    #[error("Recommendation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl OrchestratorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchestratorError::Recommend(e) => e.kind(),
            OrchestratorError::Catalog(_) | OrchestratorError::Task(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Main orchestrator. Cheap to clone; clones share the provider.
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    provider: Arc<dyn CatalogProvider>,
    config: EngineConfig,
}

impl RecommendationOrchestrator {
    /// Create a new orchestrator
    ///
    /// # Arguments
    /// * `provider` - Catalog source, owned and managed by the caller
    /// * `config` - Engine tunables (threshold, result sizes)
    pub fn new(provider: Arc<dyn CatalogProvider>, config: EngineConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Most-rated book titles. An empty Vec is a valid answer.
    #[instrument(skip(self))]
    pub async fn get_popular(&self) -> Result<Vec<String>> {
        let start_time = Instant::now();
        let snapshot = self.fetch_snapshot().await?;

        let ranker = PopularityRanker::new().with_top_n(self.config.top_n);
        let titles = tokio::task::spawn_blocking(move || {
            ranker.rank(&snapshot.books, &snapshot.ratings)
        })
        .await?;

        if titles.is_empty() {
            warn!("No rated books available for popularity ranking");
        }
        info!(
            "Selected {} popular books in {:.2?}",
            titles.len(),
            start_time.elapsed()
        );
        Ok(titles)
    }

    /// Titles similar to `book_id`.
    pub async fn get_content_based(&self, book_id: &str) -> Result<Vec<String>> {
        Ok(self.get_content_based_detailed(book_id).await?.titles)
    }

    /// Like `get_content_based`, but also reports which cascade stage answered.
    #[instrument(skip(self))]
    pub async fn get_content_based_detailed(&self, book_id: &str) -> Result<SimilarTitles> {
        let start_time = Instant::now();
        let book_id = book_id.trim().to_string();
        let snapshot = self.fetch_snapshot().await?;

        if !snapshot.contains_book(&book_id) {
            warn!("Book with ISBN {} not found in catalog", book_id);
            return Err(RecommendError::BookNotFound { book_id }.into());
        }

        let index = SimilarityIndex::new(self.config);
        let result = tokio::task::spawn_blocking(move || index.recommend(&snapshot, &book_id))
            .await??;

        info!(
            "Content-based recommendations ({:?}): {} titles in {:.2?}",
            result.strategy,
            result.titles.len(),
            start_time.elapsed()
        );
        Ok(result)
    }

    /// Fetch a request-scoped snapshot off the async runtime.
    async fn fetch_snapshot(&self) -> Result<CatalogSnapshot> {
        let provider = Arc::clone(&self.provider);
        let snapshot = tokio::task::spawn_blocking(move || provider.snapshot()).await??;
        let (books, ratings) = snapshot.counts();
        info!("Fetched snapshot: {} books, {} ratings", books, ratings);
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{BookRecord, InMemoryCatalog, RatingRecord};
    use engine::Strategy;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    fn rated(id: &str, times: usize) -> Vec<RatingRecord> {
        (0..times).map(|_| RatingRecord::new(id, 7)).collect()
    }

    /// Dune, Dune Messiah and a cookbook; only the Dune books clear T = 20.
    fn build_test_catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(
            vec![
                BookRecord::new("A", "Dune", "Herbert", "Ace", 1990),
                BookRecord::new("B", "Dune Messiah", "Herbert", "Ace", 1987),
                BookRecord::new("C", "Cooking 101", "Chef", "Books", 2001),
            ],
            [rated("A", 30), rated("B", 20), rated("C", 2)].concat(),
        )
    }

    fn build_test_orchestrator() -> RecommendationOrchestrator {
        RecommendationOrchestrator::new(Arc::new(build_test_catalog()), EngineConfig::default())
    }

    /// Provider whose backend is always down
    struct FailingProvider;

    impl CatalogProvider for FailingProvider {
        fn fetch_catalog(&self) -> catalog::Result<Vec<BookRecord>> {
            Err(CatalogError::Unavailable("connection refused".to_string()))
        }

        fn fetch_ratings(&self) -> catalog::Result<Vec<RatingRecord>> {
            Err(CatalogError::Unavailable("connection refused".to_string()))
        }
    }

    // ============================================================================
    // get_popular
    // ============================================================================

    #[tokio::test]
    async fn test_get_popular_orders_by_count() {
        let orchestrator = build_test_orchestrator();
        let titles = orchestrator.get_popular().await.unwrap();
        assert_eq!(titles, vec!["Dune", "Dune Messiah", "Cooking 101"]);
    }

    #[tokio::test]
    async fn test_get_popular_with_no_ratings_is_empty() {
        let catalog = InMemoryCatalog::new(build_test_catalog().books().to_vec(), vec![]);
        let orchestrator =
            RecommendationOrchestrator::new(Arc::new(catalog), EngineConfig::default());

        let titles = orchestrator.get_popular().await.unwrap();
        assert!(titles.is_empty());
    }

    #[tokio::test]
    async fn test_get_popular_is_idempotent() {
        let orchestrator = build_test_orchestrator();
        let first = orchestrator.get_popular().await.unwrap();
        let second = orchestrator.get_popular().await.unwrap();
        assert_eq!(first, second);
    }

    // ============================================================================
    // get_content_based
    // ============================================================================

    #[tokio::test]
    async fn test_get_content_based_excludes_target() {
        let orchestrator = build_test_orchestrator();
        let titles = orchestrator.get_content_based("A").await.unwrap();
        assert_eq!(titles, vec!["Dune Messiah"]);
    }

    #[tokio::test]
    async fn test_get_content_based_trims_id() {
        let orchestrator = build_test_orchestrator();
        let titles = orchestrator.get_content_based("  A ").await.unwrap();
        assert_eq!(titles, vec!["Dune Messiah"]);
    }

    #[tokio::test]
    async fn test_get_content_based_reports_widening() {
        let orchestrator = build_test_orchestrator();
        let result = orchestrator.get_content_based_detailed("C").await.unwrap();
        assert_eq!(result.strategy, Strategy::FullCatalog);
        assert_eq!(result.titles, vec!["Dune", "Dune Messiah"]);
    }

    #[tokio::test]
    async fn test_get_content_based_unknown_id_is_not_found() {
        let orchestrator = build_test_orchestrator();
        let err = orchestrator.get_content_based("nope").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.kind().http_status(), 404);
        assert!(matches!(
            err,
            OrchestratorError::Recommend(RecommendError::BookNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_content_based_without_text_signal_is_not_found() {
        let catalog = InMemoryCatalog::new(
            vec![BookRecord::new("jp", "東京", "村上", "講談社", 2000)],
            vec![],
        );
        let orchestrator =
            RecommendationOrchestrator::new(Arc::new(catalog), EngineConfig::default());

        let err = orchestrator.get_content_based("jp").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    // ============================================================================
    // Provider failures
    // ============================================================================

    #[tokio::test]
    async fn test_provider_failure_is_internal() {
        let orchestrator =
            RecommendationOrchestrator::new(Arc::new(FailingProvider), EngineConfig::default());

        let err = orchestrator.get_popular().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.kind().http_status(), 500);

        let err = orchestrator.get_content_based("A").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Catalog(_)));
    }

    #[tokio::test]
    async fn test_concurrent_requests_agree() {
        let orchestrator = build_test_orchestrator();

        let mut handles = vec![];
        for _ in 0..8 {
            let orchestrator = orchestrator.clone();
            handles.push(tokio::spawn(async move {
                orchestrator.get_content_based("B").await
            }));
        }

        let mut results = vec![];
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert!(!results[0].contains(&"Dune Messiah".to_string()));
    }
}
