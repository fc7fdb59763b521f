use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.config.load_value();
    Json(state.config.redact_sensitive_values(&config))
}

pub async fn reload(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let chunks = state.reload().await?;
    Ok(Json(json!({"status": "reloaded", "chunks": chunks})))
}
