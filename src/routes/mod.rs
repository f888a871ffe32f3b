// HTTP routes: thin JSON wrappers over the Monitor query surface.

mod http;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::monitor::Monitor;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) monitor: Monitor,
}

pub fn app(monitor: Monitor) -> Router {
    let state = AppState { monitor };
    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/current", get(http::current_handler)) // GET /api/current
        .route("/api/short-history", get(http::short_history_handler)) // GET /api/short-history
        .route("/api/long-history", get(http::long_history_handler)) // GET /api/long-history
        .route("/api/available-dates", get(http::available_dates_handler)) // GET /api/available-dates
        .route("/api/log-data/{date}", get(http::log_data_handler)) // GET /api/log-data/2024-01-31
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
