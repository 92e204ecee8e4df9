//! Core data model for the rating snapshot.
//!
//! The matching engine runs against three read-only structures loaded once at
//! startup: the sparse user-by-movie `RatingTable`, the `PopularityIndex`,
//! and the `MovieCatalog` used by the outer layers for display titles.
//!
//! Row and column order are the snapshot file's order and are preserved
//! end to end: downstream tie-breaking depends on them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{DataLoadError, Result};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user (a row in the rating table)
pub type UserId = u32;

/// Unique identifier for a movie (a column in the rating table)
pub type MovieId = u32;

/// Smallest rating value a snapshot cell may hold (half-star scale)
pub const MIN_RATING_VALUE: f32 = 0.5;

/// Largest rating value a snapshot cell may hold
pub const MAX_RATING_VALUE: f32 = 5.0;

// =============================================================================
// Movie Catalog
// =============================================================================

/// A single catalog entry: movie id plus display title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieEntry {
    pub id: MovieId,
    pub title: String,
}

/// Movie id -> title lookup, in snapshot file order.
///
/// Only the server and CLI layers consult this; the matching engine works
/// purely on ids.
#[derive(Debug, Clone, Default)]
pub struct MovieCatalog {
    entries: Vec<MovieEntry>,
    by_id: HashMap<MovieId, usize>,
}

impl MovieCatalog {
    /// Build a catalog from entries in file order.
    ///
    /// Returns `DuplicateId` if the same movie id appears twice.
    pub fn new(entries: Vec<MovieEntry>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(entries.len());
        for (pos, entry) in entries.iter().enumerate() {
            if by_id.insert(entry.id, pos).is_some() {
                return Err(DataLoadError::DuplicateId {
                    entity: "movie".to_string(),
                    id: entry.id,
                });
            }
        }
        Ok(Self { entries, by_id })
    }

    /// Look up the display title for a movie
    pub fn title(&self, movie: MovieId) -> Option<&str> {
        self.by_id
            .get(&movie)
            .map(|&pos| self.entries[pos].title.as_str())
    }

    /// All entries in file order
    pub fn entries(&self) -> &[MovieEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Popularity Index
// =============================================================================

/// Movie id -> precomputed popularity score.
///
/// The index is not guaranteed to cover every table column; selection logic
/// drops movies it knows nothing about.
#[derive(Debug, Clone, Default)]
pub struct PopularityIndex {
    scores: HashMap<MovieId, f32>,
}

impl PopularityIndex {
    /// Build an index from (movie, score) pairs.
    ///
    /// Returns `DuplicateId` if the same movie id appears twice.
    pub fn new(entries: Vec<(MovieId, f32)>) -> Result<Self> {
        let mut scores = HashMap::with_capacity(entries.len());
        for (movie, score) in entries {
            if scores.insert(movie, score).is_some() {
                return Err(DataLoadError::DuplicateId {
                    entity: "movie".to_string(),
                    id: movie,
                });
            }
        }
        Ok(Self { scores })
    }

    /// Popularity score for a movie, if known
    pub fn score(&self, movie: MovieId) -> Option<f32> {
        self.scores.get(&movie).copied()
    }

    pub fn contains(&self, movie: MovieId) -> bool {
        self.scores.contains_key(&movie)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

// =============================================================================
// Rating Table
// =============================================================================

/// Sparse user-by-movie rating matrix.
///
/// Rows are users in snapshot order, columns are movies in header order.
/// Cells are per-row maps: an absent key means the user never rated that
/// movie. The table is append-only during load and immutable afterwards.
#[derive(Debug, Clone)]
pub struct RatingTable {
    users: Vec<UserId>,
    movies: Vec<MovieId>,
    user_index: HashMap<UserId, usize>,
    movie_index: HashMap<MovieId, usize>,
    rows: Vec<HashMap<MovieId, f32>>,
}

impl RatingTable {
    /// Create an empty table with a fixed column set.
    ///
    /// Returns `DuplicateId` if the same movie id appears twice.
    pub fn new(movies: Vec<MovieId>) -> Result<Self> {
        let mut movie_index = HashMap::with_capacity(movies.len());
        for (pos, &movie) in movies.iter().enumerate() {
            if movie_index.insert(movie, pos).is_some() {
                return Err(DataLoadError::DuplicateId {
                    entity: "movie".to_string(),
                    id: movie,
                });
            }
        }
        Ok(Self {
            users: Vec::new(),
            movies,
            user_index: HashMap::new(),
            movie_index,
            rows: Vec::new(),
        })
    }

    /// Append a user row.
    ///
    /// Returns `DuplicateId` for a repeated user id and `ValidationError`
    /// if a rating references a movie outside the column set.
    pub fn push_row(&mut self, user: UserId, ratings: HashMap<MovieId, f32>) -> Result<()> {
        if self.user_index.contains_key(&user) {
            return Err(DataLoadError::DuplicateId {
                entity: "user".to_string(),
                id: user,
            });
        }
        for movie in ratings.keys() {
            if !self.movie_index.contains_key(movie) {
                return Err(DataLoadError::ValidationError(format!(
                    "user {} rates movie {} absent from the column set",
                    user, movie
                )));
            }
        }
        self.user_index.insert(user, self.rows.len());
        self.users.push(user);
        self.rows.push(ratings);
        Ok(())
    }

    /// Number of user rows
    pub fn user_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of movie columns
    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    /// User ids in row order
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// Movie ids in column order
    pub fn movies(&self) -> &[MovieId] {
        &self.movies
    }

    pub fn contains_user(&self, user: UserId) -> bool {
        self.user_index.contains_key(&user)
    }

    pub fn contains_movie(&self, movie: MovieId) -> bool {
        self.movie_index.contains_key(&movie)
    }

    /// User id at a row position
    pub fn user_at(&self, row: usize) -> UserId {
        self.users[row]
    }

    /// Present ratings at a row position
    pub fn ratings_at(&self, row: usize) -> &HashMap<MovieId, f32> {
        &self.rows[row]
    }

    /// Present ratings for a user id
    pub fn ratings_for(&self, user: UserId) -> Option<&HashMap<MovieId, f32>> {
        self.user_index.get(&user).map(|&row| &self.rows[row])
    }

    /// Single cell lookup
    pub fn rating(&self, user: UserId, movie: MovieId) -> Option<f32> {
        self.ratings_for(user).and_then(|r| r.get(&movie)).copied()
    }
}
