use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::{calendars, health, status};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))

        // Cache status
        .route("/api/status", get(status::get_status))

        // Published calendars
        .route("/:name", get(calendars::get_calendar))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
