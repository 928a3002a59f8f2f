//! HTTP error responses for the citecache server.
//!
//! Every core error renders as `{ "error": CODE, "message": ... }` with a
//! status chosen by error kind.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use citecache_core::Error;
use serde::Serialize;

/// Body of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// A core error on its way out of an axum handler.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidInput(_) | Error::UnknownBook(_) => StatusCode::BAD_REQUEST,
            Error::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Error::Database(_) | Error::MigrationFailed(_) | Error::CorruptRecord(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self.0, "request failed");
        }

        let body = ErrorBody { error: self.0.code(), message: self.0.to_string() };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(Error::InvalidInput("chapter".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError(Error::UnknownBook("Hezekiah".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError(Error::UpstreamUnavailable("timeout".into())).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError(Error::CorruptRecord("talks_json".into())).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = ApiError(Error::UnknownBook("\"Hezekiah\" is not a known book".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "UNKNOWN_BOOK");
        assert!(json["message"].as_str().unwrap().contains("Hezekiah"));
    }
}
