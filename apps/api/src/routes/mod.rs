pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::optimization::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/keywords", post(handlers::handle_keywords))
        .route("/api/v1/score", post(handlers::handle_score))
        .route("/api/v1/optimize", post(handlers::handle_optimize))
        .route(
            "/api/v1/optimize/download",
            post(handlers::handle_optimize_download),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
