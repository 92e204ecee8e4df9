//! Shared application state.

use matcher::Recommender;

/// State handed to every request handler.
///
/// The recommender is cheap to clone: it carries the snapshot behind an
/// `Arc` plus a copy of the match configuration.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Recommender,
}

impl AppState {
    pub fn new(recommender: Recommender) -> Self {
        Self { recommender }
    }
}
