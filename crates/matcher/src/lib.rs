//! # Matcher Crate
//!
//! Finds the most similar user for a set of movie ratings and turns that
//! match into recommendations. Matching relaxes progressively: it starts
//! from the full query and retries on smaller random or popularity-ranked
//! subsets until a candidate clears the similarity threshold.
//!
//! ## Main Components
//!
//! - **Query handling** (`query`): canonical, table-filtered rating vectors
//! - **Relaxation plan** (`strategy`, `subset`): the fixed fraction/mode
//!   sequence and subset sampling
//! - **Candidate search** (`candidates`, `knn`): coverage filtering and
//!   cosine-ranked nearest neighbors
//! - **Driver** (`planner`): walks the sequence and applies the threshold
//! - **Selection** (`selector`): top-n unseen movies from one matched user
//! - **Facade** (`recommender`): snapshot + config + seed in one handle
//!
//! ## Example Usage
//!
//! ```ignore
//! use matcher::Recommender;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let snapshot = Arc::new(dataset::Snapshot::load_from_dir("data/snapshot")?);
//! let recommender = Recommender::new(snapshot);
//! let outcome = recommender.recommend(&HashMap::from([(1, 5.0), (2, 4.0)]));
//! ```

pub mod config;
pub mod query;
pub mod strategy;
pub mod subset;
pub mod candidates;
pub mod knn;
pub mod planner;
pub mod selector;
pub mod recommender;

pub use candidates::covering_rows;
pub use config::{
    MatchConfig, DEFAULT_MIN_RATING, DEFAULT_SEED, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_N,
    MIN_QUERY_RATINGS,
};
pub use knn::{cosine_similarity, nearest_neighbors, Neighbor, MAX_NEIGHBORS};
pub use planner::{find_best_match, MatchResult};
pub use query::QueryVector;
pub use recommender::{RecommendationOutcome, Recommender};
pub use selector::{select_recommendations, Selection};
pub use strategy::{RelaxationStep, SubsetMode, RELAXATION_SEQUENCE};
pub use subset::{sample_count, select_subset};
