use std::time::Duration;

use axum::{Router, http::StatusCode, routing::get};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{citations::get_citations, health::healthz},
    state::AppState,
};

/// Create the application router with all routes and middleware.
///
/// The request timeout sits above the resolver's live fetch bound so a slow
/// upstream surfaces as a 502 rather than a 408.
pub fn create_app(state: AppState) -> Router {
    let request_timeout = state.service.config().live_timeout + Duration::from_secs(5);

    Router::new()
        .route("/citations", get(get_citations))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .with_state(state)
}
