//! Service facade tying matching and selection together.
//!
//! A [`Recommender`] owns a shared snapshot and a match configuration and
//! answers rating-map requests. Runs are deterministic: each request seeds
//! its own RNG from the service seed.

use crate::config::{MatchConfig, DEFAULT_SEED};
use crate::planner::{find_best_match, MatchResult};
use crate::query::QueryVector;
use crate::selector::select_recommendations;
use dataset::{MovieId, Snapshot, UserId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Final answer for a recommendation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RecommendationOutcome {
    /// Top-n unseen movies sourced from a single matched user
    Recommended {
        movies: Vec<MovieId>,
        matched_user: UserId,
        similarity: f32,
    },
    /// No user cleared the similarity threshold
    NoMatch,
    /// A user matched but none could fill the top-n
    NoRecommendation { matched_user: UserId, similarity: f32 },
}

/// Recommendation engine over a loaded snapshot
#[derive(Clone)]
pub struct Recommender {
    snapshot: Arc<Snapshot>,
    config: MatchConfig,
    seed: u64,
}

impl Recommender {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self {
            snapshot,
            config: MatchConfig::default(),
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Count how many of the given ratings refer to movies in the table
    pub fn known_ratings(&self, ratings: &HashMap<MovieId, f32>) -> usize {
        ratings
            .keys()
            .filter(|movie| self.snapshot.table.contains_movie(**movie))
            .count()
    }

    /// Run the relaxation search without selecting recommendations
    #[instrument(skip(self, ratings), fields(ratings = ratings.len()))]
    pub fn find_similar_user(&self, ratings: &HashMap<MovieId, f32>) -> MatchResult {
        let query = self.build_query(ratings);
        let mut rng = StdRng::seed_from_u64(self.seed);
        find_best_match(
            &self.snapshot.table,
            &self.snapshot.popularity,
            &query,
            &self.config,
            &mut rng,
        )
    }

    /// Answer a rating-map request with the service configuration
    #[instrument(skip(self, ratings), fields(ratings = ratings.len()))]
    pub fn recommend(&self, ratings: &HashMap<MovieId, f32>) -> RecommendationOutcome {
        self.recommend_with(ratings, &self.config)
    }

    /// Answer a rating-map request with a per-request configuration
    pub fn recommend_with(
        &self,
        ratings: &HashMap<MovieId, f32>,
        config: &MatchConfig,
    ) -> RecommendationOutcome {
        let query = self.build_query(ratings);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let result = find_best_match(
            &self.snapshot.table,
            &self.snapshot.popularity,
            &query,
            config,
            &mut rng,
        );

        let Some(matched_user) = result.best_user else {
            info!(
                strategies_tried = result.strategies_tried,
                "No sufficiently similar user"
            );
            return RecommendationOutcome::NoMatch;
        };

        match select_recommendations(&self.snapshot.table, &result, config) {
            Some(selection) => {
                info!(
                    matched_user = selection.user_id,
                    movies = selection.movies.len(),
                    "Recommendations ready"
                );
                RecommendationOutcome::Recommended {
                    movies: selection.movies,
                    matched_user: selection.user_id,
                    similarity: selection.similarity,
                }
            }
            None => {
                info!(matched_user, "Matched user but nothing to recommend");
                RecommendationOutcome::NoRecommendation {
                    matched_user,
                    similarity: result.similarity,
                }
            }
        }
    }

    fn build_query(&self, ratings: &HashMap<MovieId, f32>) -> QueryVector {
        QueryVector::new(ratings.iter().map(|(&movie, &score)| (movie, score)))
            .retain_known(&self.snapshot.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset::{MovieCatalog, MovieEntry, PopularityIndex, RatingTable};

    fn create_test_snapshot() -> Arc<Snapshot> {
        let mut table = RatingTable::new(vec![10, 20, 30, 40, 50]).unwrap();
        table
            .push_row(
                1,
                HashMap::from([(10, 5.0), (20, 4.5), (30, 4.5), (40, 4.0), (50, 5.0)]),
            )
            .unwrap();
        table
            .push_row(2, HashMap::from([(10, 1.0), (20, 5.0), (30, 2.0)]))
            .unwrap();
        table
            .push_row(3, HashMap::from([(10, 4.5), (20, 4.0), (50, 3.0)]))
            .unwrap();

        let catalog = MovieCatalog::new(vec![
            MovieEntry {
                id: 10,
                title: "The Vanishing Point".to_string(),
            },
            MovieEntry {
                id: 20,
                title: "Night Harbor".to_string(),
            },
            MovieEntry {
                id: 30,
                title: "Glass Orchard".to_string(),
            },
            MovieEntry {
                id: 40,
                title: "Silent Meridian".to_string(),
            },
            MovieEntry {
                id: 50,
                title: "Paper Lanterns".to_string(),
            },
        ])
        .unwrap();

        let popularity =
            PopularityIndex::new(vec![(10, 3.0), (20, 3.0), (30, 2.0), (40, 1.0), (50, 2.0)])
                .unwrap();

        Arc::new(Snapshot {
            table,
            popularity,
            catalog,
        })
    }

    #[test]
    fn test_recommend_sources_from_best_match() {
        let recommender = Recommender::new(create_test_snapshot());
        let ratings = HashMap::from([(10, 5.0), (20, 4.5)]);

        let outcome = recommender.recommend(&ratings);

        match outcome {
            RecommendationOutcome::Recommended {
                movies,
                matched_user,
                similarity,
            } => {
                assert_eq!(matched_user, 1);
                assert!(similarity > 0.99);
                // User 1's unseen movies ranked by rating: 50, 30, 40
                assert_eq!(movies, vec![50, 30, 40]);
            }
            other => panic!("expected a recommendation, got {other:?}"),
        }
    }

    #[test]
    fn test_recommend_is_deterministic() {
        let recommender = Recommender::new(create_test_snapshot());
        let ratings = HashMap::from([(10, 5.0), (20, 4.5)]);

        let first = recommender.recommend(&ratings);
        let second = recommender.recommend(&ratings);

        assert_eq!(first, second);
    }

    #[test]
    fn test_no_match_when_threshold_unreachable() {
        let config = MatchConfig::default().with_similarity_threshold(1.5);
        let recommender = Recommender::new(create_test_snapshot()).with_config(config);
        let ratings = HashMap::from([(10, 5.0), (20, 4.5)]);

        assert_eq!(
            recommender.recommend(&ratings),
            RecommendationOutcome::NoMatch
        );
    }

    #[test]
    fn test_no_recommendation_when_everything_watched() {
        let recommender = Recommender::new(create_test_snapshot());
        let ratings =
            HashMap::from([(10, 5.0), (20, 4.5), (30, 4.5), (40, 4.0), (50, 5.0)]);

        match recommender.recommend(&ratings) {
            RecommendationOutcome::NoRecommendation {
                matched_user,
                similarity,
            } => {
                assert_eq!(matched_user, 1);
                assert!(similarity > 0.99);
            }
            other => panic!("expected no recommendation, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_movies_dropped_before_matching() {
        let recommender = Recommender::new(create_test_snapshot());

        assert_eq!(
            recommender.known_ratings(&HashMap::from([(10, 5.0), (999, 4.0)])),
            1
        );
        // A query of only unknown movies never reaches the table
        assert_eq!(
            recommender.recommend(&HashMap::from([(999, 5.0)])),
            RecommendationOutcome::NoMatch
        );
    }

    #[test]
    fn test_find_similar_user_exposes_strategy_count() {
        let recommender = Recommender::new(create_test_snapshot());
        let ratings = HashMap::from([(10, 5.0), (20, 4.5)]);

        let result = recommender.find_similar_user(&ratings);

        assert_eq!(result.best_user, Some(1));
        assert_eq!(result.strategies_tried, 1);
    }
}
