//! Tunable matching parameters.
//!
//! Defaults mirror the production service settings; the server accepts
//! per-request overrides and the CLI exposes them as flags.

use serde::{Deserialize, Serialize};

/// Minimum similarity a neighbor must STRICTLY exceed to be accepted
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;

/// Minimum rating a neighbor's movie needs to qualify as a recommendation
pub const DEFAULT_MIN_RATING: f32 = 4.0;

/// Number of movies a successful recommendation returns
pub const DEFAULT_TOP_N: usize = 3;

/// Service-level seed for the per-request random stream
pub const DEFAULT_SEED: u64 = 42;

/// Minimum number of known-movie ratings a query must carry.
///
/// The engine itself accepts any query; callers enforce this floor at
/// their own boundary before dispatching.
pub const MIN_QUERY_RATINGS: usize = 7;

/// Parameters for one match-and-recommend run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Acceptance threshold for the best neighbor's similarity
    pub similarity_threshold: f32,
    /// Rating floor for recommended movies
    pub min_rating: f32,
    /// Number of movies to recommend
    pub top_n: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            min_rating: DEFAULT_MIN_RATING,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl MatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the similarity threshold (default: 0.7)
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Configure the rating floor (default: 4.0)
    pub fn with_min_rating(mut self, min_rating: f32) -> Self {
        self.min_rating = min_rating;
        self
    }

    /// Configure how many movies to recommend (default: 3)
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}
