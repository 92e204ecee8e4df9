use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dataset::{MovieEntry, MovieId, Snapshot};
use matcher::{RecommendationOutcome, Recommender, MIN_QUERY_RATINGS};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// CineMatch - taste-based movie recommendations
#[derive(Parser)]
#[command(name = "cinematch")]
#[command(about = "Find movies through users who share your taste", long_about = None)]
struct Cli {
    /// Path to the snapshot directory
    #[arg(short, long, default_value = "data/snapshot")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get recommendations from a set of your own ratings
    Recommend {
        /// A single rating as movie_id=score, repeatable (e.g. --rating 50=4.5)
        #[arg(long = "rating", value_parser = parse_rating)]
        ratings: Vec<(MovieId, f32)>,

        /// JSON file holding a {"movie_id": score} map
        #[arg(long)]
        ratings_file: Option<PathBuf>,

        /// Similarity a matched user must exceed
        #[arg(long)]
        threshold: Option<f32>,

        /// Smallest rating a recommended movie may carry
        #[arg(long)]
        min_rating: Option<f32>,

        /// Number of recommendations to return
        #[arg(long)]
        top_n: Option<usize>,

        /// Seed for the subset draws
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load the snapshot (this may take a moment)
    println!("Loading snapshot from {}...", cli.data_dir.display());
    let start = Instant::now();
    let snapshot = Arc::new(
        Snapshot::load_from_dir(&cli.data_dir).context("Failed to load snapshot")?,
    );
    println!(
        "{} Loaded {} users and {} movies in {:?}",
        "✓".green(),
        snapshot.table.user_count(),
        snapshot.table.movie_count(),
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            ratings,
            ratings_file,
            threshold,
            min_rating,
            top_n,
            seed,
        } => handle_recommend(
            snapshot,
            ratings,
            ratings_file,
            threshold,
            min_rating,
            top_n,
            seed,
        )?,
        Commands::Search { title } => handle_search(snapshot, title)?,
        Commands::Benchmark { requests } => handle_benchmark(snapshot, requests).await?,
    }

    Ok(())
}

/// Parse a movie_id=score pair given on the command line
fn parse_rating(s: &str) -> Result<(MovieId, f32), String> {
    let (id, score) = s
        .split_once('=')
        .ok_or_else(|| format!("expected movie_id=score, got '{s}'"))?;
    let id: MovieId = id
        .trim()
        .parse()
        .map_err(|_| format!("bad movie id '{id}'"))?;
    let score: f32 = score
        .trim()
        .parse()
        .map_err(|_| format!("bad score '{score}'"))?;
    Ok((id, score))
}

/// Handle the 'recommend' command
fn handle_recommend(
    snapshot: Arc<Snapshot>,
    ratings: Vec<(MovieId, f32)>,
    ratings_file: Option<PathBuf>,
    threshold: Option<f32>,
    min_rating: Option<f32>,
    top_n: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let mut query: HashMap<MovieId, f32> = ratings.into_iter().collect();
    if let Some(path) = ratings_file {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let from_file: HashMap<MovieId, f32> = serde_json::from_str(&text)
            .context("Ratings file must hold a {\"movie_id\": score} map")?;
        query.extend(from_file);
    }
    if query.is_empty() {
        return Err(anyhow!("No ratings given; use --rating or --ratings-file"));
    }

    let mut recommender = Recommender::new(snapshot.clone());
    if let Some(seed) = seed {
        recommender = recommender.with_seed(seed);
    }

    let known = recommender.known_ratings(&query);
    if known < MIN_QUERY_RATINGS {
        return Err(anyhow!(
            "Need at least {} ratings of movies in the snapshot, got {}",
            MIN_QUERY_RATINGS,
            known
        ));
    }
    debug!(known, "validated recommendation query");

    let mut config = *recommender.config();
    if let Some(threshold) = threshold {
        config = config.with_similarity_threshold(threshold);
    }
    if let Some(min_rating) = min_rating {
        config = config.with_min_rating(min_rating);
    }
    if let Some(top_n) = top_n {
        config = config.with_top_n(top_n);
    }

    let start = Instant::now();
    let outcome = recommender.recommend_with(&query, &config);
    let elapsed = start.elapsed();

    match outcome {
        RecommendationOutcome::Recommended {
            movies,
            matched_user,
            similarity,
        } => {
            println!(
                "{}",
                format!("Matched user {} (similarity {:.3})", matched_user, similarity)
                    .bold()
                    .blue()
            );
            for (i, movie) in movies.iter().enumerate() {
                let title = snapshot.catalog.title(*movie).unwrap_or("(untitled)");
                println!("{}. {} (movie {})", (i + 1).to_string().green(), title, movie);
            }
        }
        RecommendationOutcome::NoMatch => {
            println!("{}", "No user in the snapshot shares your taste.".yellow());
        }
        RecommendationOutcome::NoRecommendation {
            matched_user,
            similarity,
        } => {
            println!(
                "{}",
                format!(
                    "User {} shares your taste (similarity {:.3}) but has nothing new for you.",
                    matched_user, similarity
                )
                .yellow()
            );
        }
    }
    println!("Answered in {:?}", elapsed);

    Ok(())
}

/// Handle the 'search' command
fn handle_search(snapshot: Arc<Snapshot>, title: String) -> Result<()> {
    let title_lower = title.to_lowercase();
    let mut matches: Vec<(&MovieEntry, usize)> = Vec::new();

    for entry in snapshot.catalog.entries() {
        let entry_title_lower = entry.title.to_lowercase();
        if entry_title_lower == title_lower {
            // Exact match
            matches.push((entry, 0));
        } else if entry_title_lower.contains(&title_lower) {
            // Substring match
            matches.push((entry, 1));
        }
    }

    // Sort by relevance (exact match first, then by popularity)
    matches.sort_by(|a, b| {
        a.1.cmp(&b.1).then_with(|| {
            let pop_a = snapshot.popularity.score(a.0.id).unwrap_or(0.0);
            let pop_b = snapshot.popularity.score(b.0.id).unwrap_or(0.0);
            pop_b.partial_cmp(&pop_a).unwrap_or(std::cmp::Ordering::Equal)
        })
    });

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("No movies matched.");
        return Ok(());
    }
    for (entry, _) in matches.iter().take(20) {
        match snapshot.popularity.score(entry.id) {
            Some(score) => println!("{}: {} (popularity {:.1})", entry.id, entry.title, score),
            None => println!("{}: {}", entry.id, entry.title),
        }
    }

    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(snapshot: Arc<Snapshot>, requests: usize) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("Benchmark needs at least one request"));
    }
    if snapshot.table.user_count() == 0 {
        return Err(anyhow!("Snapshot has no users to draw queries from"));
    }

    let recommender = Recommender::new(snapshot.clone());

    // Each request replays a random user's full rating row as the query
    let rows: Vec<usize> = (0..requests)
        .map(|_| rand::random::<u32>() as usize % snapshot.table.user_count())
        .collect();

    let mut handles = vec![];
    for (i, row) in rows.into_iter().enumerate() {
        let recommender = recommender.clone().with_seed(i as u64);
        let ratings = snapshot.table.ratings_at(row).clone();
        let handle = tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            recommender.recommend(&ratings);
            start.elapsed()
        });
        handles.push(handle);
    }

    // Wait for all tasks to finish and collect timings
    let mut timings = vec![];
    for handle in handles {
        timings.push(handle.await?);
    }

    let total: std::time::Duration = timings.iter().sum();
    let average = total / (timings.len() as u32);
    timings.sort();
    let percentile =
        |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];

    println!(
        "{}",
        format!("Benchmark over {} requests:", requests).bold().blue()
    );
    println!("  Total time:      {:?}", total);
    println!("  Average latency: {:?}", average);
    println!(
        "  p50 / p95 / p99: {:?} / {:?} / {:?}",
        percentile(0.50),
        percentile(0.95),
        percentile(0.99)
    );
    println!(
        "  Throughput:      {:.2} requests/second",
        requests as f32 / total.as_secs_f32()
    );

    Ok(())
}
