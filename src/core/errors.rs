use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Failures raised by the retrieval and answer pipeline.
///
/// Only load-time variants (`CorpusFormat`, `Io`, `Embedding`, `Config`) ever
/// reach a caller. Generation variants are recovered inside the composer.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("corpus format error: {0}")]
    CorpusFormat(String),
    #[error("failed to read corpus {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("generation unavailable: {0}")]
    GenerationUnavailable(String),
    #[error("generation failed: {0}")]
    GenerationFailure(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AssistantError {
    pub fn corpus<S: Into<String>>(msg: S) -> Self {
        AssistantError::CorpusFormat(msg.into())
    }

    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        AssistantError::Embedding(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::Config(msg) => ApiError::BadRequest(msg),
            other => ApiError::internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
