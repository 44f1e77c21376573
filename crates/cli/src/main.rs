use anyhow::{Context, Result, anyhow};
use catalog::{AggregateRating, BookId, BookRecord, InMemoryCatalog};
use clap::{Parser, Subcommand};
use colored::Colorize;
use engine::{EngineConfig, Strategy, aggregate_ratings};
use rand::seq::IndexedRandom;
use serde::Serialize;
use server::{OrchestratorError, RecommendationOrchestrator};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "info";

/// ShelfRecs - Book Recommendation Engine
#[derive(Parser)]
#[command(name = "shelf-recs")]
#[command(about = "Book recommendations by popularity and content similarity", long_about = None)]
struct Cli {
    /// Path to Book-Crossing dataset directory
    #[arg(short, long, default_value = "data/book-crossing")]
    data_dir: PathBuf,

    /// Print results as JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the most-rated books
    Popular {
        /// Number of titles to return
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Get books similar to a given ISBN
    Similar {
        /// ISBN of the book to find similar titles for
        #[arg(long)]
        isbn: String,

        /// Minimum rating count for the popular subset
        #[arg(long, default_value = "20")]
        threshold: u32,

        /// Number of titles to return
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Show a book and its rating statistics
    Book {
        /// ISBN of the book to display
        #[arg(long)]
        isbn: String,
    },

    /// Search for books by title
    Search {
        /// Title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

/// A book with its aggregate rating, as printed by `book` and `search`.
#[derive(Debug, Serialize)]
struct BookView<'a> {
    #[serde(flatten)]
    book: &'a BookRecord,
    mean_rating: f32,
    rating_count: u32,
}

impl<'a> BookView<'a> {
    /// Unrated books show as 0 ratings with a 0.0 mean.
    fn new(book: &'a BookRecord, aggregates: &HashMap<BookId, AggregateRating>) -> Self {
        let (mean_rating, rating_count) = aggregates
            .get(&book.id)
            .map_or((0.0, 0), |a| (a.mean_rating, a.rating_count));
        Self {
            book,
            mean_rating,
            rating_count,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        // Keep stdout clean for results and `--json`
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load the catalog (the ratings file is large)
    if !cli.json {
        println!("Loading Book-Crossing dataset from {}...", cli.data_dir.display());
    }
    let start = Instant::now();
    let catalog = Arc::new(
        InMemoryCatalog::load_from_dir(&cli.data_dir)
            .context("Failed to load Book-Crossing dataset")?,
    );
    if !cli.json {
        let (books, ratings) = catalog.counts();
        println!(
            "{} Loaded {} books and {} ratings in {:?}",
            "✓".green(),
            books,
            ratings,
            start.elapsed()
        );
    }

    match cli.command {
        Commands::Popular { limit } => handle_popular(catalog, limit, cli.json).await?,
        Commands::Similar {
            isbn,
            threshold,
            limit,
        } => handle_similar(catalog, &isbn, threshold, limit, cli.json).await?,
        Commands::Book { isbn } => handle_book(&catalog, &isbn, cli.json)?,
        Commands::Search { title } => handle_search(&catalog, &title, cli.json)?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(catalog, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'popular' command
async fn handle_popular(catalog: Arc<InMemoryCatalog>, limit: usize, json: bool) -> Result<()> {
    let config = EngineConfig::default().with_top_n(limit);
    let orchestrator = RecommendationOrchestrator::new(catalog, config);
    let titles = orchestrator.get_popular().await.map_err(describe_error)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&titles)?);
        return Ok(());
    }

    println!("{}", "Popular Books:".bold().blue());
    if titles.is_empty() {
        println!("  (no rated books)");
    }
    print_titles(&titles);
    Ok(())
}

/// Handle the 'similar' command
async fn handle_similar(
    catalog: Arc<InMemoryCatalog>,
    isbn: &str,
    threshold: u32,
    limit: usize,
    json: bool,
) -> Result<()> {
    let config = EngineConfig::default()
        .with_popularity_threshold(threshold)
        .with_max_similar(limit)
        .with_top_n(limit);
    let orchestrator = RecommendationOrchestrator::new(catalog, config);
    let similar = orchestrator
        .get_content_based_detailed(isbn)
        .await
        .map_err(describe_error)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&similar)?);
        return Ok(());
    }

    println!("{}", format!("Books similar to {}:", isbn.trim()).bold().blue());
    match similar.strategy {
        Strategy::PopularSubset => {}
        Strategy::FullCatalog => println!(
            "{}",
            "  (book below the popularity threshold, searched the full catalog)".yellow()
        ),
        Strategy::PopularityFallback => println!(
            "{}",
            "  (no similar titles found, showing popular books instead)".yellow()
        ),
    }
    print_titles(&similar.titles);
    Ok(())
}

/// Handle the 'book' command
fn handle_book(catalog: &InMemoryCatalog, isbn: &str, json: bool) -> Result<()> {
    let isbn = isbn.trim();
    let book = catalog
        .books()
        .iter()
        .find(|b| b.id == isbn)
        .ok_or_else(|| anyhow!("Book with ISBN {} not found", isbn))?;

    let aggregates = aggregate_ratings(catalog.ratings());
    let view = BookView::new(book, &aggregates);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", format!("{} ({})", book.title, book.id).bold().blue());
    println!("{}Author: {}", "• ".green(), book.author);
    println!("{}Publisher: {}", "• ".green(), book.publisher);
    println!("{}Year: {}", "• ".green(), book.year);
    println!("{}Number of ratings: {}", "• ".cyan(), view.rating_count);
    println!("{}Average rating: {:.2}", "• ".cyan(), view.mean_rating);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(catalog: &InMemoryCatalog, title: &str, json: bool) -> Result<()> {
    let aggregates = aggregate_ratings(catalog.ratings());
    let needle = title.to_lowercase();

    // (exact match rank, view)
    let mut matches: Vec<(u8, BookView)> = catalog
        .books()
        .iter()
        .filter_map(|book| {
            let haystack = book.title.to_lowercase();
            let rank = if haystack == needle {
                0
            } else if haystack.contains(&needle) {
                1
            } else {
                return None;
            };
            Some((rank, BookView::new(book, &aggregates)))
        })
        .collect();

    matches.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| b.1.rating_count.cmp(&a.1.rating_count))
    });
    let results: Vec<BookView> = matches.into_iter().take(20).map(|(_, view)| view).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    for view in &results {
        println!(
            "{}: {} by {} avg {:.2} ({} ratings)",
            view.book.id, view.book.title, view.book.author, view.mean_rating, view.rating_count
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    catalog: Arc<InMemoryCatalog>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("Benchmark needs at least one request"));
    }

    // Random ISBNs from the catalog
    let isbns: Vec<String> = {
        let mut rng = rand::rng();
        let books = catalog.books();
        (0..requests)
            .filter_map(|_| books.choose(&mut rng).map(|b| b.id.clone()))
            .collect()
    };
    if isbns.is_empty() {
        return Err(anyhow!("Catalog is empty, nothing to benchmark"));
    }

    let orchestrator = RecommendationOrchestrator::new(catalog, EngineConfig::default());
    let permits = Arc::new(Semaphore::new(concurrent.max(1)));

    let wall_clock = Instant::now();
    let mut handles = vec![];
    for isbn in isbns {
        let orchestrator = orchestrator.clone();
        let permits = Arc::clone(&permits);
        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            // NotFound outcomes are valid responses and still count
            let outcome = orchestrator.get_content_based(&isbn).await;
            Ok::<_, anyhow::Error>((start.elapsed(), outcome.is_ok()))
        }));
    }

    let mut timings = vec![];
    let mut failures = 0usize;
    for handle in handles {
        let (elapsed, ok) = handle.await??;
        if !ok {
            failures += 1;
        }
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    let latency_sum: Duration = timings.iter().sum();
    let avg_latency = latency_sum / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = timings.len() as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} errors)", timings.len(), failures);
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Turn an orchestrator error into a message carrying its HTTP status.
fn describe_error(err: OrchestratorError) -> anyhow::Error {
    let label = match err.kind() {
        engine::ErrorKind::NotFound => "not found",
        engine::ErrorKind::Internal => "internal error",
    };
    anyhow!("{} (HTTP {}): {}", label, err.kind().http_status(), err)
}

fn print_titles(titles: &[String]) {
    for (i, title) in titles.iter().enumerate() {
        println!("{}. {}", (i + 1).to_string().green(), title);
    }
}
