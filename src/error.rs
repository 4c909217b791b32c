use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure kinds surfaced by the core operations. `Duplicate` and
/// `Validation` are expected user-facing outcomes; `Store` is surfaced for
/// the caller's retry policy and never retried here, since multi-step writes
/// carry no idempotency token and a blind retry could double-count.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} already exists")]
    Duplicate(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("store unavailable: {0}")]
    Store(#[from] redis::RedisError),

    #[error("inconsistent state: {0}")]
    Inconsistent(&'static str),

    #[error("upstream error: {0}")]
    Upstream(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Inconsistent(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "status": "error",
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
