pub mod generate;
pub mod health;

pub use generate::generate;
pub use health::health_check;

use crate::state::AppState;
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_request_size_mb * 1024 * 1024;

    Router::new()
        .route("/health", get(health_check))
        .route("/generate", get(generate).post(generate))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
