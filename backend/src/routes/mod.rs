//! Route definitions for the Cupping Journal API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - tasting records
        .nest("/evaluations", evaluation_routes(state))
}

/// Evaluation routes (protected)
fn evaluation_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_evaluations).post(handlers::create_evaluation),
        )
        .route(
            "/:evaluation_id",
            get(handlers::get_evaluation).delete(handlers::delete_evaluation),
        )
        .route("/:evaluation_id/favorite", post(handlers::toggle_favorite))
        // Report projections
        .route("/:evaluation_id/report", get(handlers::get_report))
        .route("/:evaluation_id/pdf", get(handlers::get_pdf_items))
        .route("/:evaluation_id/radar", get(handlers::get_radar))
        .route("/:evaluation_id/narrative", post(handlers::generate_narrative))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
