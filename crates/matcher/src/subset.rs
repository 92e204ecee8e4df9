//! Subset selection.
//!
//! Each relaxation step narrows the query to a subset of its movies. The
//! subset is always returned in ascending id order; which movies it contains
//! is the mode's business, their order is not.

use crate::query::QueryVector;
use crate::strategy::{RelaxationStep, SubsetMode};
use dataset::{MovieId, PopularityIndex};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Number of movies a fractional step targets: floor(n * fraction), never 0
pub fn sample_count(n: usize, fraction: f32) -> usize {
    ((n as f32 * fraction).floor() as usize).max(1)
}

/// Pick the movies one strategy step works with.
///
/// Random draws from `rng` without replacement; the caller owns the stream
/// so successive draws within one request continue it. Popular computes its
/// target count against the FULL query size, then drops movies the
/// popularity index doesn't know; equal scores keep ascending id order.
pub fn select_subset(
    query: &QueryVector,
    step: RelaxationStep,
    popularity: &PopularityIndex,
    rng: &mut impl Rng,
) -> Vec<MovieId> {
    let movies = query.movies();

    match step.mode {
        SubsetMode::All => movies,
        SubsetMode::Random => {
            let count = sample_count(movies.len(), step.fraction);
            let mut picked: Vec<MovieId> =
                movies.choose_multiple(rng, count).copied().collect();
            picked.sort_unstable();
            picked
        }
        SubsetMode::Popular => {
            let count = sample_count(movies.len(), step.fraction);
            let mut scored: Vec<(MovieId, f32)> = movies
                .iter()
                .filter_map(|&movie| popularity.score(movie).map(|score| (movie, score)))
                .collect();
            scored.sort_by(|a, b| {
                b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
            });
            scored.truncate(count);

            let mut picked: Vec<MovieId> = scored.into_iter().map(|(movie, _)| movie).collect();
            picked.sort_unstable();
            picked
        }
    }
}
