//! Nearest-neighbor search over a movie subset.
//!
//! Candidates are compared to the query by cosine distance on the subset's
//! axes only. Every candidate covers the subset by construction, so the
//! vectors are dense and aligned.

use crate::query::QueryVector;
use dataset::{MovieId, RatingTable, UserId};
use serde::Serialize;

/// Upper bound on neighbors returned per search
pub const MAX_NEIGHBORS: usize = 4;

/// A candidate user together with its similarity to the query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub user_id: UserId,
    pub similarity: f32,
}

/// Cosine similarity of two aligned vectors.
///
/// Accumulates in f64 and clamps into [-1, 1]. A near-zero magnitude on
/// either side yields 0.0 instead of dividing by nothing.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += x as f64 * y as f64;
        norm_a += x as f64 * x as f64;
        norm_b += y as f64 * y as f64;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator < 1e-10 {
        return 0.0;
    }

    ((dot / denominator) as f32).clamp(-1.0, 1.0)
}

/// Find the k nearest candidates to the query on the subset's axes.
///
/// Returns at most `min(k, rows.len())` neighbors ordered by descending
/// similarity; equal similarities keep table row order (stable sort).
pub fn nearest_neighbors(
    table: &RatingTable,
    rows: &[usize],
    subset: &[MovieId],
    query: &QueryVector,
    k: usize,
) -> Vec<Neighbor> {
    let query_vec: Vec<f32> = subset
        .iter()
        .map(|&movie| query.rating(movie).unwrap_or(0.0))
        .collect();

    let mut neighbors: Vec<Neighbor> = rows
        .iter()
        .map(|&row| {
            let ratings = table.ratings_at(row);
            let row_vec: Vec<f32> = subset
                .iter()
                .map(|&movie| ratings.get(&movie).copied().unwrap_or(0.0))
                .collect();
            Neighbor {
                user_id: table.user_at(row),
                similarity: cosine_similarity(&query_vec, &row_vec),
            }
        })
        .collect();

    neighbors.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    neighbors.truncate(k);
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn create_test_table() -> RatingTable {
        let mut table = RatingTable::new(vec![10, 20, 30]).unwrap();
        table
            .push_row(1, HashMap::from([(10, 5.0), (20, 4.0), (30, 3.0)]))
            .unwrap();
        table
            .push_row(2, HashMap::from([(10, 1.0), (20, 5.0), (30, 2.0)]))
            .unwrap();
        table
            .push_row(3, HashMap::from([(10, 5.0), (20, 4.0), (30, 3.0)]))
            .unwrap();
        table
            .push_row(4, HashMap::from([(10, 2.0), (20, 2.0), (30, 5.0)]))
            .unwrap();
        table
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let sim = cosine_similarity(&[5.0, 4.0, 3.0], &[5.0, 4.0, 3.0]);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_scaled_vectors_match() {
        // Cosine ignores magnitude: a user rating everything twice as high
        // still points the same way.
        let sim = cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_magnitude() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_nearest_neighbors_orders_by_similarity() {
        let table = create_test_table();
        let query = QueryVector::new(vec![(10, 5.0), (20, 4.0), (30, 3.0)]);
        let subset = [10, 20, 30];
        let rows: Vec<usize> = (0..table.user_count()).collect();

        let neighbors = nearest_neighbors(&table, &rows, &subset, &query, MAX_NEIGHBORS);

        assert_eq!(neighbors.len(), 4);
        // Users 1 and 3 are exact matches, user 2 and 4 point elsewhere
        assert_eq!(neighbors[0].user_id, 1);
        assert_eq!(neighbors[1].user_id, 3);
        assert!((neighbors[0].similarity - 1.0).abs() < 1e-6);
        for pair in neighbors.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        for neighbor in &neighbors {
            assert!(neighbor.similarity >= -1.0 && neighbor.similarity <= 1.0);
        }
    }

    #[test]
    fn test_nearest_neighbors_ties_keep_row_order() {
        let table = create_test_table();
        let query = QueryVector::new(vec![(10, 5.0), (20, 4.0), (30, 3.0)]);
        let subset = [10, 20, 30];

        // Rows 0 and 2 hold identical rating vectors; the earlier row wins
        let neighbors = nearest_neighbors(&table, &[0, 2], &subset, &query, 2);

        assert_eq!(neighbors[0].user_id, 1);
        assert_eq!(neighbors[1].user_id, 3);
    }

    #[test]
    fn test_nearest_neighbors_k_bound() {
        let table = create_test_table();
        let query = QueryVector::new(vec![(10, 5.0), (20, 4.0), (30, 3.0)]);
        let subset = [10, 20, 30];

        let neighbors = nearest_neighbors(&table, &[0, 1], &subset, &query, MAX_NEIGHBORS);
        assert_eq!(neighbors.len(), 2);

        let neighbors = nearest_neighbors(&table, &[0, 1, 2, 3], &subset, &query, 2);
        assert_eq!(neighbors.len(), 2);
    }
}
