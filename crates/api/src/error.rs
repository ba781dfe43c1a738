use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fingenius_core::engine::EngineErrorKind;
use fingenius_core::error::CoreError;
use serde_json::json;

const INTERNAL_DETAIL: &str = "Internal error while processing the request.";

/// Error surfaced to HTTP clients as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let (status, detail) = match &err {
            CoreError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CoreError::Engine(e) => match e.kind() {
                EngineErrorKind::BadInput => (StatusCode::BAD_REQUEST, e.to_string()),
                EngineErrorKind::Fault => {
                    sentry::capture_error(&err);
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
            },
            CoreError::Internal(detail) => {
                sentry::capture_error(&err);
                tracing::error!(%detail, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_DETAIL.to_string())
            }
        };
        Self { status, detail }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
