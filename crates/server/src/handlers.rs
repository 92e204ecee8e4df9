//! Request handlers and wire types.
//!
//! The matching engine is synchronous and CPU-bound, so the recommend
//! handler runs it on the blocking pool. A panic inside a single request
//! surfaces as a join error and becomes a 500, never a crashed process.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error};

use dataset::{MovieId, UserId, MAX_RATING_VALUE, MIN_RATING_VALUE};
use matcher::{MatchConfig, RecommendationOutcome, MIN_QUERY_RATINGS};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    /// Movie id -> rating on the 0.5..=5.0 scale
    pub ratings: HashMap<MovieId, f32>,
    /// Optional similarity threshold override
    pub threshold: Option<f32>,
    /// Optional minimum-rating override
    pub min_rating: Option<f32>,
    /// Optional result-count override
    pub top_n: Option<usize>,
}

impl RecommendRequest {
    /// Service defaults overlaid with whatever the request pins down
    fn config_for(&self, base: &MatchConfig) -> MatchConfig {
        let mut config = *base;
        if let Some(threshold) = self.threshold {
            config = config.with_similarity_threshold(threshold);
        }
        if let Some(min_rating) = self.min_rating {
            config = config.with_min_rating(min_rating);
        }
        if let Some(top_n) = self.top_n {
            config = config.with_top_n(top_n);
        }
        config
    }
}

/// One catalog entry on the wire
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub movie_id: MovieId,
    pub title: String,
}

/// Successful recommendation envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub status: &'static str,
    pub recommended_movies: Vec<String>,
    pub matched_user: UserId,
    pub similarity: f32,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// List the full movie catalog in file order
pub async fn list_movies(State(state): State<AppState>) -> Json<Vec<MovieSummary>> {
    let movies = state
        .recommender
        .snapshot()
        .catalog
        .entries()
        .iter()
        .map(|entry| MovieSummary {
            movie_id: entry.id,
            title: entry.title.clone(),
        })
        .collect();
    Json(movies)
}

/// Look up a single movie by identifier
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> ApiResult<Json<MovieSummary>> {
    match state.recommender.snapshot().catalog.title(id) {
        Some(title) => Ok(Json(MovieSummary {
            movie_id: id,
            title: title.to_string(),
        })),
        None => Err(ApiError::NotFound(format!("no movie with id {id}"))),
    }
}

/// Produce recommendations for a rating map
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> ApiResult<Json<RecommendResponse>> {
    validate_ratings(&request.ratings)?;

    let known = state.recommender.known_ratings(&request.ratings);
    if known < MIN_QUERY_RATINGS {
        return Err(ApiError::InvalidInput(format!(
            "at least {MIN_QUERY_RATINGS} ratings of known movies are required, got {known}"
        )));
    }
    debug!(ratings = request.ratings.len(), known, "Recommendation request");

    let config = request.config_for(state.recommender.config());
    let recommender = state.recommender.clone();
    let ratings = request.ratings;
    let outcome =
        tokio::task::spawn_blocking(move || recommender.recommend_with(&ratings, &config))
            .await
            .map_err(|err| {
                error!(error = %err, "Recommendation task failed");
                ApiError::Internal(format!("recommendation task failed: {err}"))
            })?;

    match outcome {
        RecommendationOutcome::Recommended {
            movies,
            matched_user,
            similarity,
        } => Ok(Json(RecommendResponse {
            status: "success",
            recommended_movies: titles_for(&movies, &state),
            matched_user,
            similarity,
        })),
        RecommendationOutcome::NoMatch => Err(ApiError::NoResult {
            message: "could not find a sufficiently similar user".to_string(),
            details: "Try rating more movies, especially popular ones.".to_string(),
        }),
        RecommendationOutcome::NoRecommendation { matched_user, .. } => Err(ApiError::NoResult {
            message: "could not find movies to recommend".to_string(),
            details: format!(
                "User {matched_user} matched, but had no unseen, highly rated movies to offer."
            ),
        }),
    }
}

/// Reject ratings outside the dataset scale before any matching work.
/// The range check also catches NaN, which would poison cosine math.
fn validate_ratings(ratings: &HashMap<MovieId, f32>) -> ApiResult<()> {
    for (&movie, &value) in ratings {
        if !(MIN_RATING_VALUE..=MAX_RATING_VALUE).contains(&value) {
            return Err(ApiError::InvalidInput(format!(
                "rating {value} for movie {movie} is outside [{MIN_RATING_VALUE}, {MAX_RATING_VALUE}]"
            )));
        }
    }
    Ok(())
}

/// Translate movie ids into display titles, keeping list length
fn titles_for(movies: &[MovieId], state: &AppState) -> Vec<String> {
    let catalog = &state.recommender.snapshot().catalog;
    movies
        .iter()
        .map(|&id| {
            catalog
                .title(id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Movie {id}"))
        })
        .collect()
}
