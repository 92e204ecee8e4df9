//! # Server Crate
//!
//! HTTP front end for the matching engine. Exposes the movie catalog and
//! the recommendation operation over a small JSON API; the snapshot is
//! loaded once at startup and shared read-only across requests.
//!
//! ## Main Components
//!
//! - **Routes** (`create_router`): health, catalog, and recommend endpoints
//! - **Handlers** (`handlers`): wire types and request validation
//! - **Errors** (`error`): JSON error bodies with mapped status codes

pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Catalog
        .route("/api/movies", get(handlers::list_movies))
        .route("/api/movies/:id", get(handlers::get_movie))
        // Matching
        .route("/api/recommend", post(handlers::recommend))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
