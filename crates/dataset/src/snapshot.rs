//! Snapshot loading.
//!
//! A snapshot is the full read-only data set the service runs on: the rating
//! table plus the popularity index and the title catalog. It is loaded once
//! at process start and shared behind `Arc` afterwards; there is no reload
//! path.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::{MovieCatalog, PopularityIndex, RatingTable};
use std::path::Path;
use tracing::{info, warn};

/// Wide rating pivot file name inside a snapshot directory
pub const RATINGS_MATRIX_FILE: &str = "ratings_matrix.csv";

/// Movie catalog file name
pub const MOVIES_FILE: &str = "movies.csv";

/// Popularity index file name
pub const POPULARITY_FILE: &str = "popularity.csv";

/// The loaded, validated data set
#[derive(Debug)]
pub struct Snapshot {
    pub table: RatingTable,
    pub popularity: PopularityIndex,
    pub catalog: MovieCatalog,
}

impl Snapshot {
    /// Load and validate a snapshot from a directory.
    ///
    /// The three files are parsed in parallel; nested joins give three-way
    /// parallelism. Any parse or validation failure aborts the load.
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading rating snapshot from {}", data_dir.display());

        let ratings_path = data_dir.join(RATINGS_MATRIX_FILE);
        let movies_path = data_dir.join(MOVIES_FILE);
        let popularity_path = data_dir.join(POPULARITY_FILE);

        let ((table, catalog), popularity) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_ratings_matrix(&ratings_path),
                    || parser::parse_movie_catalog(&movies_path),
                )
            },
            || parser::parse_popularity(&popularity_path),
        );

        let table = table?;
        let catalog = catalog?;
        let popularity = popularity?;

        let snapshot = Self {
            table,
            popularity,
            catalog,
        };
        snapshot.validate()?;

        info!(
            "Loaded {} users x {} movies, {} popularity entries, {} titles",
            snapshot.table.user_count(),
            snapshot.table.movie_count(),
            snapshot.popularity.len(),
            snapshot.catalog.len()
        );

        let untitled = snapshot
            .table
            .movies()
            .iter()
            .filter(|&&movie| snapshot.catalog.title(movie).is_none())
            .count();
        if untitled > 0 {
            warn!("{} rated movies have no catalog title", untitled);
        }

        Ok(snapshot)
    }

    /// Snapshot-level validation.
    ///
    /// Duplicate ids are already rejected during construction; this checks
    /// that the table has at least one row and one column.
    pub fn validate(&self) -> Result<()> {
        if self.table.user_count() == 0 {
            return Err(DataLoadError::ValidationError(
                "rating table has no user rows".to_string(),
            ));
        }
        if self.table.movie_count() == 0 {
            return Err(DataLoadError::ValidationError(
                "rating table has no movie columns".to_string(),
            ));
        }
        Ok(())
    }
}
