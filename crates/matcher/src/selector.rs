//! Recommendation selection from matched neighbors.
//!
//! The accepting neighbor is tried first, then the extras in descending
//! similarity. A candidate only contributes if it can fill the full top-n
//! on its own; otherwise the walk falls through to the next one.

use crate::config::MatchConfig;
use crate::knn::Neighbor;
use crate::planner::MatchResult;
use dataset::{MovieId, RatingTable, UserId};
use std::collections::HashSet;
use tracing::debug;

/// Movies sourced from a single matched user
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub user_id: UserId,
    pub similarity: f32,
    pub movies: Vec<MovieId>,
}

/// Pick top-n unseen, well-rated movies from the match's neighbors.
///
/// Ratings are ranked per candidate before filtering; equal ratings keep
/// the table's column order. Returns `None` when no candidate can fill
/// the full top-n.
pub fn select_recommendations(
    table: &RatingTable,
    result: &MatchResult,
    config: &MatchConfig,
) -> Option<Selection> {
    let best_user = result.best_user?;
    let watched: HashSet<MovieId> = result.query_movies.iter().copied().collect();

    let candidates = std::iter::once(Neighbor {
        user_id: best_user,
        similarity: result.similarity,
    })
    .chain(result.extras.iter().copied());

    for candidate in candidates {
        let Some(ratings) = table.ratings_for(candidate.user_id) else {
            continue;
        };

        let mut rated: Vec<(MovieId, f32)> = table
            .movies()
            .iter()
            .filter_map(|&movie| ratings.get(&movie).map(|&score| (movie, score)))
            .collect();
        rated.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let qualifying: Vec<MovieId> = rated
            .iter()
            .filter(|(movie, score)| !watched.contains(movie) && *score >= config.min_rating)
            .map(|&(movie, _)| movie)
            .collect();

        if qualifying.len() >= config.top_n {
            debug!(
                user_id = candidate.user_id,
                qualifying = qualifying.len(),
                "Candidate fills the top-n"
            );
            return Some(Selection {
                user_id: candidate.user_id,
                similarity: candidate.similarity,
                movies: qualifying.into_iter().take(config.top_n).collect(),
            });
        }

        debug!(
            user_id = candidate.user_id,
            qualifying = qualifying.len(),
            needed = config.top_n,
            "Candidate cannot fill the top-n, trying next"
        );
    }

    None
}
