use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

/// Rejects blank queries before they reach retrieval.
pub(crate) fn require_query(query: &str) -> Result<&str, ApiError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest("Query must not be empty".to_string()));
    }
    Ok(trimmed)
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = require_query(&payload.query)?;
    let result = state.assistant().await.answer(query).await?;
    Ok(Json(result))
}
