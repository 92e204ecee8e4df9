//! CineMatch API server binary.
//!
//! Loads the rating snapshot once, then serves the catalog and
//! recommendation endpoints until shut down.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dataset::Snapshot;
use matcher::Recommender;
use server::{create_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "cinematch-server", about = "CineMatch recommendation API server")]
struct Args {
    /// Directory holding the snapshot CSV files
    #[arg(long, default_value = "data/snapshot")]
    data_dir: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Fixed seed for the per-request subset draws
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server=debug,matcher=debug,dataset=debug".into()),
        )
        .init();

    info!("Starting CineMatch server");

    info!("Loading snapshot from {}", args.data_dir.display());
    let snapshot = Arc::new(
        Snapshot::load_from_dir(&args.data_dir)
            .with_context(|| format!("loading snapshot from {}", args.data_dir.display()))?,
    );
    info!(
        "Snapshot loaded: {} users, {} movies",
        snapshot.table.user_count(),
        snapshot.table.movie_count()
    );

    let mut recommender = Recommender::new(snapshot);
    if let Some(seed) = args.seed {
        recommender = recommender.with_seed(seed);
    }

    let app = create_router(AppState::new(recommender));

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("binding {}", args.addr))?;
    info!("Listening on {}", args.addr);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
