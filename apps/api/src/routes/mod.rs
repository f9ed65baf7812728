pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assembly API
        .route("/api/v1/assemble/:schema", post(handlers::handle_assemble))
        .route("/api/v1/assemblies/:id", get(handlers::handle_get_assembly))
        // Pipeline API
        .route(
            "/api/v1/resumes/strategic-analysis",
            post(handlers::handle_strategic_analysis),
        )
        .route(
            "/api/v1/cover-letters/strategic",
            post(handlers::handle_cover_letter),
        )
        .route("/api/v1/themes", post(handlers::handle_theme))
        .with_state(state)
}
