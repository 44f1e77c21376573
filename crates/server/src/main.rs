//! Simple test harness for the recommendation orchestrator.
//!
//! Loads a Book-Crossing directory and prints both recommendation kinds.
//!
//! Usage: server [DATA_DIR] [ISBN]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use catalog::InMemoryCatalog;
use engine::EngineConfig;
use server::RecommendationOrchestrator;

const DEFAULT_DATA_DIR: &str = "data/book-crossing";
const DEFAULT_ISBN: &str = "0441172717";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info,server=debug,engine=debug")
        .init();

    info!("Starting ShelfRecs server test harness");

    let mut args = std::env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));
    let isbn = args.next().unwrap_or_else(|| DEFAULT_ISBN.to_string());

    info!("Loading catalog from {}...", data_dir.display());
    let catalog = Arc::new(load_catalog(&data_dir)?);
    let orchestrator = RecommendationOrchestrator::new(catalog, EngineConfig::default());

    let popular = orchestrator.get_popular().await?;
    info!("Popular books:");
    for (i, title) in popular.iter().enumerate() {
        info!("{}. {}", i + 1, title);
    }

    match orchestrator.get_content_based_detailed(&isbn).await {
        Ok(similar) => {
            info!("Books similar to {} ({:?}):", isbn, similar.strategy);
            for (i, title) in similar.titles.iter().enumerate() {
                info!("{}. {}", i + 1, title);
            }
        }
        Err(e) => warn!("{} -> HTTP {}: {}", isbn, e.kind().http_status(), e),
    }

    Ok(())
}

fn load_catalog(data_dir: &Path) -> Result<InMemoryCatalog> {
    InMemoryCatalog::load_from_dir(data_dir).context("Failed to load Book-Crossing dataset")
}
