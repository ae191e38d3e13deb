//! Route definitions for the AgriScore API

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
        // Everything below requires a farmer access token
        .merge(protected_routes(state))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/evaluations", evaluation_routes())
        .nest("/scores", score_routes())
        .route("/dashboard", get(handlers::get_dashboard))
        .nest("/applications", application_routes())
        .route(
            "/profile",
            get(handlers::get_profile)
                .post(handlers::create_profile)
                .put(handlers::update_profile),
        )
        .route("/weather/:region", get(handlers::get_regional_weather))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Evaluation routes
fn evaluation_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::submit_evaluation))
        .route("/preview", post(handlers::preview_evaluation))
}

/// Score history routes
fn score_routes() -> Router<AppState> {
    Router::new()
        .route("/latest", get(handlers::get_latest_score))
        .route("/history", get(handlers::get_score_history))
}

/// Credit application routes
fn application_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_applications).post(handlers::create_application),
        )
        .route(
            "/:application_id",
            get(handlers::get_application)
                .put(handlers::update_application)
                .delete(handlers::delete_application),
        )
}
