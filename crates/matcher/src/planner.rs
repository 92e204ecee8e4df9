//! Progressive relaxation driver.
//!
//! Walks the relaxation sequence until a primary neighbor clears the
//! similarity threshold. Acceptance short-circuits the remaining steps;
//! exhausting the sequence yields a no-match result.

use crate::config::MatchConfig;
use crate::knn::{nearest_neighbors, Neighbor, MAX_NEIGHBORS};
use crate::query::QueryVector;
use crate::strategy::RELAXATION_SEQUENCE;
use crate::subset::select_subset;
use crate::candidates::covering_rows;
use dataset::{MovieId, PopularityIndex, RatingTable, UserId};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Outcome of a relaxation run.
///
/// `best_user` is `None` when every strategy fell short; `query_movies` is
/// the full query's movie set, regardless of which subset the accepting
/// step used; `extras` holds the remaining neighbors from that step,
/// ordered by descending similarity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub best_user: Option<UserId>,
    pub similarity: f32,
    pub query_movies: Vec<MovieId>,
    pub extras: Vec<Neighbor>,
    pub strategies_tried: usize,
}

impl MatchResult {
    /// Whether a neighbor cleared the threshold
    pub fn is_match(&self) -> bool {
        self.best_user.is_some()
    }

    fn no_match(query_movies: Vec<MovieId>, strategies_tried: usize) -> Self {
        Self {
            best_user: None,
            similarity: -1.0,
            query_movies,
            extras: Vec::new(),
            strategies_tried,
        }
    }
}

/// Run the relaxation sequence against the rating table.
///
/// Each step narrows the query to a subset of movies, gathers the users who
/// rated the whole subset, and ranks them by cosine similarity. The first
/// step whose top candidate strictly exceeds the threshold wins.
#[instrument(skip_all, fields(query_movies = query.len()))]
pub fn find_best_match(
    table: &RatingTable,
    popularity: &PopularityIndex,
    query: &QueryVector,
    config: &MatchConfig,
    rng: &mut impl Rng,
) -> MatchResult {
    if query.is_empty() {
        debug!("Empty query, skipping relaxation");
        return MatchResult::no_match(Vec::new(), 0);
    }

    for (attempt, step) in RELAXATION_SEQUENCE.into_iter().enumerate() {
        let subset = select_subset(query, step, popularity, rng);
        let rows = covering_rows(table, &subset);
        debug!(
            strategy = %step,
            subset_len = subset.len(),
            candidates = rows.len(),
            "Evaluating relaxation step"
        );
        if rows.is_empty() {
            continue;
        }

        let neighbors = nearest_neighbors(table, &rows, &subset, query, MAX_NEIGHBORS);
        let Some(primary) = neighbors.first().copied() else {
            continue;
        };

        if primary.similarity > config.similarity_threshold {
            info!(
                user_id = primary.user_id,
                similarity = primary.similarity,
                strategy = %step,
                strategies_tried = attempt + 1,
                "Accepted neighbor"
            );
            return MatchResult {
                best_user: Some(primary.user_id),
                similarity: primary.similarity,
                query_movies: query.movies(),
                extras: neighbors[1..].to_vec(),
                strategies_tried: attempt + 1,
            };
        }

        debug!(
            similarity = primary.similarity,
            threshold = config.similarity_threshold,
            "Best candidate below threshold"
        );
    }

    info!("Relaxation exhausted without a match");
    MatchResult::no_match(query.movies(), RELAXATION_SEQUENCE.len())
}
