//! `GET /healthz` probe.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::state::AppState;

/// GET /healthz - store reachability and record count.
///
/// Returns 503 if the citation store cannot be queried.
pub async fn healthz(State(state): State<AppState>) -> Response {
    match state.service.db().count_citations().await {
        Ok(count) => (StatusCode::OK, Json(json!({ "status": "ok", "cachedCitations": count }))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "unavailable", "error": e.code() })))
                .into_response()
        }
    }
}
