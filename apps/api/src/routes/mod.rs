pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::letter::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/letters/extract", post(handlers::handle_extract))
        .route("/api/v1/letters/generate", post(handlers::handle_generate))
        .route("/api/v1/letters/render", post(handlers::handle_render))
        .with_state(state)
}
