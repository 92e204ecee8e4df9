//! Candidate filtering.
//!
//! A strategy only compares the query against users who rated EVERY movie in
//! the chosen subset; partial overlap is not enough. Qualifying rows come
//! back in table order, which later stages rely on for tie-breaking.

use dataset::{MovieId, RatingTable};

/// Row indices of users whose ratings cover the whole subset.
///
/// An empty subset qualifies no one: full coverage of nothing is vacuous and
/// would otherwise match every user.
pub fn covering_rows(table: &RatingTable, subset: &[MovieId]) -> Vec<usize> {
    if subset.is_empty() {
        return Vec::new();
    }

    (0..table.user_count())
        .filter(|&row| {
            let ratings = table.ratings_at(row);
            subset.iter().all(|movie| ratings.contains_key(movie))
        })
        .collect()
}
