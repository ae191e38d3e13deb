//! AgriScore backend
//!
//! HTTP API for farm evaluations, credit scores and their history, loan
//! applications and farmer profiles.

use std::sync::Arc;

use axum::{routing::get, Router};
use shared::HistoryWindow;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use crate::external::WeatherClient;
use crate::services::{Clock, ScoreHistoryService, SystemClock, WeatherService};
use crate::store::ScoreStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub store: Arc<dyn ScoreStore>,
    pub clock: Arc<dyn Clock>,
    pub weather: WeatherService,
}

impl AppState {
    /// State with the wall clock and a weather client built from `config`
    pub fn new(db: sqlx::PgPool, config: Config, store: Arc<dyn ScoreStore>) -> Self {
        let weather = WeatherService::new(
            config
                .weather_api_key()
                .map(|key| WeatherClient::new(key, config.weather.api_endpoint.as_str())),
        );

        Self {
            db,
            config: Arc::new(config),
            store,
            clock: Arc::new(SystemClock),
            weather,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn history(&self) -> ScoreHistoryService {
        ScoreHistoryService::with_clock(self.store.clone(), self.clock.clone())
    }

    /// Configured trend chart length
    pub fn history_window(&self) -> HistoryWindow {
        HistoryWindow::new(self.config.scoring.history_limit)
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "AgriScore Credit Scoring API v1"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
