//! Per-request query vector.
//!
//! A query is the requesting user's movie -> rating map. It is canonicalized
//! to ascending movie id order at construction so that every downstream step
//! (random draws, popularity tie-breaks, vector building) sees the same
//! sequence regardless of how the caller's map iterates.

use dataset::{MovieId, RatingTable};
use std::collections::BTreeMap;

/// The requesting user's ratings in canonical (ascending id) order
#[derive(Debug, Clone, PartialEq)]
pub struct QueryVector {
    entries: Vec<(MovieId, f32)>,
}

impl QueryVector {
    /// Build a query from (movie, rating) pairs.
    ///
    /// Duplicate movie ids keep the last rating seen.
    pub fn new(ratings: impl IntoIterator<Item = (MovieId, f32)>) -> Self {
        let map: BTreeMap<MovieId, f32> = ratings.into_iter().collect();
        Self {
            entries: map.into_iter().collect(),
        }
    }

    /// Drop movies the rating table has no column for
    pub fn retain_known(mut self, table: &RatingTable) -> Self {
        self.entries.retain(|(movie, _)| table.contains_movie(*movie));
        self
    }

    /// (movie, rating) pairs in canonical order
    pub fn entries(&self) -> &[(MovieId, f32)] {
        &self.entries
    }

    /// Movie ids in canonical order
    pub fn movies(&self) -> Vec<MovieId> {
        self.entries.iter().map(|&(movie, _)| movie).collect()
    }

    /// Rating for a movie, if the query contains it
    pub fn rating(&self, movie: MovieId) -> Option<f32> {
        self.entries
            .binary_search_by_key(&movie, |&(id, _)| id)
            .ok()
            .map(|pos| self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_canonical_order() {
        let query = QueryVector::new(vec![(30, 3.0), (10, 5.0), (20, 4.0)]);

        assert_eq!(query.movies(), vec![10, 20, 30]);
        assert_eq!(query.entries(), &[(10, 5.0), (20, 4.0), (30, 3.0)]);
    }

    #[test]
    fn test_duplicate_keeps_last() {
        let query = QueryVector::new(vec![(10, 2.0), (10, 4.5)]);

        assert_eq!(query.len(), 1);
        assert_eq!(query.rating(10), Some(4.5));
    }

    #[test]
    fn test_rating_lookup() {
        let query = QueryVector::new(vec![(10, 5.0), (20, 4.0)]);

        assert_eq!(query.rating(10), Some(5.0));
        assert_eq!(query.rating(99), None);
    }

    #[test]
    fn test_retain_known() {
        let table = RatingTable::new(vec![10, 20]).unwrap();
        let query =
            QueryVector::new(vec![(10, 5.0), (20, 4.0), (99, 3.0)]).retain_known(&table);

        assert_eq!(query.movies(), vec![10, 20]);
    }

    #[test]
    fn test_retain_known_can_empty_the_query() {
        let table = RatingTable::new(vec![10]).unwrap();
        let query = QueryVector::new(vec![(98, 5.0), (99, 4.0)]).retain_known(&table);

        assert!(query.is_empty());
    }

    #[test]
    fn test_from_hash_map_iteration_order_is_irrelevant() {
        let map: HashMap<MovieId, f32> = HashMap::from([(7, 1.0), (3, 2.0), (11, 3.0)]);
        let query = QueryVector::new(map.iter().map(|(&m, &r)| (m, r)));

        assert_eq!(query.movies(), vec![3, 7, 11]);
    }
}
