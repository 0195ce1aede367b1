pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod ogp;
pub mod state;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Application routes without middleware. The binary adds tracing, CORS and
/// metrics layers on top.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/embed", get(handlers::embed::get_embed))
        .with_state(state)
}
