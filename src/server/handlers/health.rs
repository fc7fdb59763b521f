use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let assistant = state.assistant().await;
    Json(json!({
        "status": "ok",
        "chunks": assistant.chunk_count(),
        "generation": assistant.generation().status_label(),
    }))
}
